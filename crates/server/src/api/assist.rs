//! # Assist API
//!
//! Model-backed authoring aids and the staged suggestion slot.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use promptlab_core::assist::{GeneratorAnswers, Optimization, Organization, QualityAnalysis, Suggestion};
use promptlab_core::session;
use promptlab_core::state::PromptVersion;
use serde::{Deserialize, Serialize};

use super::{model_client, ApiResponse, ApiResult};
use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending: Option<Optimization>,
}

/// Raw model output to stage, or `null` to clear the slot
#[derive(Debug, Deserialize)]
pub struct StageRequest {
    #[serde(default)]
    pub raw: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    pub turn_id: String,
    #[serde(default)]
    pub annotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptOrganizationRequest {
    pub organized: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplySuggestionsRequest {
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub prompt: String,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/suggestion", get(get_pending).put(stage_pending))
        .route("/suggestion/accept", post(accept_pending))
        .route("/suggestion/reject", post(reject_pending))
        .route("/optimize", post(optimize))
        .route("/organize", post(organize))
        .route("/organize/accept", post(accept_organization))
        .route("/analyze", post(analyze))
        .route("/analyze/apply", post(apply_suggestion))
        .route("/analyze/apply-all", post(apply_all_suggestions))
        .route("/generate", post(generate))
        .route("/generate/adopt", post(adopt_generated))
}

async fn get_pending(State(state): State<SharedState>) -> Json<PendingResponse> {
    Json(PendingResponse {
        pending: state.lab.lock().await.pending().cloned(),
    })
}

async fn stage_pending(
    State(state): State<SharedState>,
    Json(req): Json<StageRequest>,
) -> ApiResult<Json<PendingResponse>> {
    let mut lab = state.lab.lock().await;
    lab.stage_pending_suggestion(req.raw.as_deref())?;
    Ok(Json(PendingResponse {
        pending: lab.pending().cloned(),
    }))
}

async fn accept_pending(State(state): State<SharedState>) -> ApiResult<Json<PromptVersion>> {
    Ok(Json(state.lab.lock().await.accept_pending()?))
}

async fn reject_pending(State(state): State<SharedState>) -> Json<ApiResponse> {
    if state.lab.lock().await.reject_pending() {
        ApiResponse::ok("Suggestion discarded")
    } else {
        ApiResponse::ok("Nothing was staged")
    }
}

async fn optimize(
    State(state): State<SharedState>,
    Json(req): Json<OptimizeRequest>,
) -> ApiResult<Json<Optimization>> {
    let client = model_client(&state).await?;
    let optimization =
        session::request_optimization(&state.lab, client.as_ref(), &req.turn_id, req.annotation.as_deref())
            .await?;
    Ok(Json(optimization))
}

async fn organize(State(state): State<SharedState>) -> ApiResult<Json<Organization>> {
    let client = model_client(&state).await?;
    Ok(Json(session::organize(&state.lab, client.as_ref()).await?))
}

async fn accept_organization(
    State(state): State<SharedState>,
    Json(req): Json<AcceptOrganizationRequest>,
) -> Json<PromptVersion> {
    Json(state.lab.lock().await.accept_organization(&req.organized))
}

async fn analyze(State(state): State<SharedState>) -> ApiResult<Json<QualityAnalysis>> {
    let client = model_client(&state).await?;
    Ok(Json(session::analyze(&state.lab, client.as_ref()).await?))
}

async fn apply_suggestion(
    State(state): State<SharedState>,
    Json(suggestion): Json<Suggestion>,
) -> Json<PromptVersion> {
    Json(state.lab.lock().await.apply_suggestion(&suggestion))
}

async fn apply_all_suggestions(
    State(state): State<SharedState>,
    Json(req): Json<ApplySuggestionsRequest>,
) -> Json<Vec<PromptVersion>> {
    Json(state.lab.lock().await.apply_all_suggestions(req.suggestions))
}

async fn generate(
    State(state): State<SharedState>,
    Json(answers): Json<GeneratorAnswers>,
) -> ApiResult<Json<GeneratedPrompt>> {
    let client = model_client(&state).await?;
    let prompt = session::generate(client.as_ref(), &answers).await?;
    Ok(Json(GeneratedPrompt { prompt }))
}

async fn adopt_generated(
    State(state): State<SharedState>,
    Json(req): Json<GeneratedPrompt>,
) -> Json<PromptVersion> {
    Json(state.lab.lock().await.adopt_generated(&req.prompt))
}
