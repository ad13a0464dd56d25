//! # Conversation API
//!
//! Chat turns, feedback and scripted test scenarios.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use promptlab_core::catalog::{self, TestScenario, SCENARIOS};
use promptlab_core::session::{self, ScenarioReport};
use promptlab_core::state::{ChatOutcome, ConversationTurn, Feedback, FeedbackStats};
use promptlab_core::LabError;
use serde::{Deserialize, Serialize};

use super::{model_client, ApiResponse, ApiResult};
use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub turns: Vec<ConversationTurn>,
    pub stats: FeedbackStats,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// `None` when the conversation was reset while the call was in flight
    pub reply: Option<ConversationTurn>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: Feedback,
    #[serde(default)]
    pub annotation: Option<String>,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/conversation", get(get_conversation).delete(clear_conversation))
        .route("/conversation/:id/feedback", post(set_feedback))
        .route("/chat", post(send_chat))
        .route("/scenarios", get(list_scenarios))
        .route("/scenarios/:id/run", post(run_scenario))
}

async fn get_conversation(State(state): State<SharedState>) -> Json<ConversationResponse> {
    let lab = state.lab.lock().await;
    Json(ConversationResponse {
        turns: lab.conversation().turns().to_vec(),
        stats: lab.conversation().stats(),
    })
}

async fn clear_conversation(State(state): State<SharedState>) -> Json<ApiResponse> {
    state.lab.lock().await.clear_conversation();
    ApiResponse::ok("Conversation cleared")
}

async fn set_feedback(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<Json<ApiResponse>> {
    let updated = state
        .lab
        .lock()
        .await
        .set_turn_feedback(&id, req.feedback, req.annotation.as_deref());
    if !updated {
        return Err(LabError::not_found("turn", id).into());
    }
    Ok(ApiResponse::ok("Feedback recorded"))
}

async fn send_chat(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequestBody>,
) -> ApiResult<Json<ChatResponse>> {
    if req.message.trim().is_empty() {
        return Err(LabError::UnsupportedInput("message is empty".into()).into());
    }

    let client = model_client(&state).await?;
    let reply = match session::send_message(&state.lab, client.as_ref(), req.message.trim()).await? {
        ChatOutcome::Replied(turn) => Some(turn),
        ChatOutcome::Discarded => None,
    };
    Ok(Json(ChatResponse { reply }))
}

async fn list_scenarios() -> Json<&'static [TestScenario]> {
    Json(SCENARIOS)
}

async fn run_scenario(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScenarioReport>> {
    let scenario = catalog::scenario(&id)?;
    let client = model_client(&state).await?;
    Ok(Json(session::run_scenario(&state.lab, client.as_ref(), scenario).await))
}
