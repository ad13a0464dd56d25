//! # Prompt API
//!
//! Current prompt, version history, export and the built-in catalog.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use promptlab_core::catalog::{
    IndustryTemplate, PromptComponent, PromptTemplate, WizardOption, BOT_TYPES, COMPONENTS,
    FEATURES, INDUSTRIES, PLATFORMS, TEMPLATES, TONES,
};
use promptlab_core::state::{export, ExportFormat, PromptVersion};
use promptlab_core::wizard::{self, WizardSelections};
use promptlab_core::LabError;
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    pub prompt: String,
    pub version_count: usize,
    pub has_knowledge: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePromptRequest {
    pub content: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardOptions {
    pub industries: &'static [IndustryTemplate],
    pub bot_types: &'static [WizardOption],
    pub tones: &'static [WizardOption],
    pub platforms: &'static [WizardOption],
    pub features: &'static [WizardOption],
}

#[derive(Debug, Serialize)]
pub struct ComposedPrompt {
    pub prompt: String,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/prompt", get(get_prompt).put(update_prompt))
        .route("/versions", get(list_versions))
        .route("/versions/:id/revert", post(revert_version))
        .route("/export", get(export_prompt))
        .route("/templates", get(list_templates))
        .route("/templates/:id/apply", post(apply_template))
        .route("/components", get(list_components))
        .route("/components/:id/insert", post(insert_component))
        .route("/wizard", get(wizard_options).post(apply_wizard))
        .route("/wizard/preview", post(preview_wizard))
}

async fn get_prompt(State(state): State<SharedState>) -> Json<PromptResponse> {
    let lab = state.lab.lock().await;
    Json(PromptResponse {
        prompt: lab.current_prompt().to_string(),
        version_count: lab.versions().len(),
        has_knowledge: !lab.knowledge().is_empty(),
    })
}

/// Save an edit. Records a version and clears the conversation.
async fn update_prompt(
    State(state): State<SharedState>,
    Json(req): Json<UpdatePromptRequest>,
) -> Json<PromptVersion> {
    let mut lab = state.lab.lock().await;
    let version = match req.reason.as_deref() {
        Some(reason) => lab.set_prompt(&req.content, Some(reason)),
        None => lab.save_manual_edit(&req.content),
    };
    Json(version)
}

/// Newest first
async fn list_versions(State(state): State<SharedState>) -> Json<Vec<PromptVersion>> {
    let lab = state.lab.lock().await;
    Json(lab.versions().newest_first().cloned().collect())
}

async fn revert_version(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PromptResponse>> {
    let mut lab = state.lab.lock().await;
    let prompt = lab.revert_to_version(&id)?.to_string();
    Ok(Json(PromptResponse {
        prompt,
        version_count: lab.versions().len(),
        has_knowledge: !lab.knowledge().is_empty(),
    }))
}

async fn export_prompt(
    State(state): State<SharedState>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let requested = query.format.as_deref().unwrap_or("markdown");
    let format = ExportFormat::from_str(requested)
        .ok_or_else(|| LabError::UnsupportedInput(format!("unknown export format: {}", requested)))?;

    let now = Utc::now();
    let body = export(&*state.lab.lock().await, format, now)?;
    let disposition = format!("attachment; filename=\"{}\"", format.file_name(now));

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

async fn list_templates() -> Json<&'static [PromptTemplate]> {
    Json(TEMPLATES)
}

async fn apply_template(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PromptVersion>> {
    Ok(Json(state.lab.lock().await.select_template(&id)?))
}

async fn list_components() -> Json<&'static [PromptComponent]> {
    Json(COMPONENTS)
}

async fn insert_component(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PromptVersion>> {
    Ok(Json(state.lab.lock().await.insert_component(&id)?))
}

async fn wizard_options() -> Json<WizardOptions> {
    Json(WizardOptions {
        industries: INDUSTRIES,
        bot_types: BOT_TYPES,
        tones: TONES,
        platforms: PLATFORMS,
        features: FEATURES,
    })
}

async fn preview_wizard(Json(selections): Json<WizardSelections>) -> Json<ComposedPrompt> {
    Json(ComposedPrompt {
        prompt: wizard::compose(&selections),
    })
}

async fn apply_wizard(
    State(state): State<SharedState>,
    Json(selections): Json<WizardSelections>,
) -> Json<PromptVersion> {
    Json(state.lab.lock().await.apply_wizard(&selections))
}
