//! # Settings API
//!
//! Runtime configuration, provider listing and the stored API key.

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use promptlab_core::{ConfigUpdate, LabConfig, LabError, LlmProvider};
use serde::{Deserialize, Serialize};

use super::{ApiResponse, ApiResult};
use crate::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub default_model: &'static str,
    pub env_var: &'static str,
    pub supports_base_url: bool,
    pub key_in_env: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyRequest {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyStatus {
    pub configured: bool,
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/config", get(get_config).patch(update_config))
        .route("/providers", get(get_providers))
        .route("/api-key", put(save_api_key).get(api_key_status))
}

async fn get_config(State(state): State<SharedState>) -> Json<LabConfig> {
    Json(state.lab.lock().await.config().clone())
}

/// Merge, validate, persist, then apply. An invalid update changes nothing.
async fn update_config(
    State(state): State<SharedState>,
    Json(update): Json<ConfigUpdate>,
) -> ApiResult<Json<LabConfig>> {
    let mut lab = state.lab.lock().await;
    let mut config = lab.config().clone();
    config.merge(update);
    config.validate()?;

    if let Err(e) = config.save(&state.runtime).await {
        tracing::warn!(error = %e, "Failed to persist config");
        return Err(LabError::Storage(e.to_string()).into());
    }

    tracing::info!(
        provider = config.model.provider.as_str(),
        model = %config.model.model,
        "Configuration updated"
    );
    lab.update_config(config.clone());
    Ok(Json(config))
}

async fn get_providers() -> Json<Vec<ProviderInfo>> {
    let providers = LlmProvider::all()
        .into_iter()
        .map(|p| ProviderInfo {
            id: p.as_str(),
            name: p.display_name(),
            default_model: p.default_model(),
            env_var: p.env_var(),
            supports_base_url: p.supports_base_url(),
            key_in_env: std::env::var(p.env_var()).is_ok_and(|v| !v.is_empty()),
        })
        .collect();
    Json(providers)
}

/// Store the key, or clear it with an empty/`null` value
async fn save_api_key(
    State(state): State<SharedState>,
    Json(req): Json<ApiKeyRequest>,
) -> ApiResult<Json<ApiResponse>> {
    let mut lab = state.lab.lock().await;
    lab.set_api_key(req.key.as_deref())?;
    Ok(if lab.api_key().is_some() {
        ApiResponse::ok("API key saved")
    } else {
        ApiResponse::ok("API key cleared")
    })
}

async fn api_key_status(State(state): State<SharedState>) -> Json<ApiKeyStatus> {
    Json(ApiKeyStatus {
        configured: state.lab.lock().await.api_key().is_some(),
    })
}
