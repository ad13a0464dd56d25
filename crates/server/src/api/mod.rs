//! # HTTP API
//!
//! JSON routes under `/api/v1`. Handlers that call a model take the state
//! lock only to read inputs and commit results.

pub mod assist;
pub mod conversation;
pub mod knowledge;
pub mod prompt;
pub mod settings;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use promptlab_core::assist::{build_client, ModelClient};
use promptlab_core::LabError;
use serde::Serialize;
use std::sync::Arc;

use crate::SharedState;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body returned by every route
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    /// Whether the client should offer a retry
    pub retryable: bool,
}

#[derive(Debug)]
pub struct ApiError(pub LabError);

impl From<LabError> for ApiError {
    fn from(err: LabError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LabError::Provider(_) | LabError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            LabError::NotFound { .. } => StatusCode::NOT_FOUND,
            LabError::UnsupportedInput(_) => StatusCode::BAD_REQUEST,
            LabError::StorageDegraded(_) => StatusCode::INSUFFICIENT_STORAGE,
            LabError::Storage(_) | LabError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = %status, error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            retryable: self.0.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

/// Generic acknowledgement
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// Client for the configured provider, keyed by the stored API key if any
pub async fn model_client(state: &SharedState) -> ApiResult<Arc<dyn ModelClient>> {
    let lab = state.lab.lock().await;
    Ok(build_client(&lab.config().model, lab.api_key())?)
}

pub fn routes() -> Router<SharedState> {
    Router::new()
        .merge(prompt::routes())
        .merge(conversation::routes())
        .merge(assist::routes())
        .nest("/knowledge", knowledge::routes())
        .merge(settings::routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LabError::Provider("down".into()), StatusCode::BAD_GATEWAY),
            (LabError::MalformedResponse("x".into()), StatusCode::BAD_GATEWAY),
            (LabError::not_found("version", "v1"), StatusCode::NOT_FOUND),
            (LabError::UnsupportedInput("big".into()), StatusCode::BAD_REQUEST),
            (LabError::StorageDegraded("quota".into()), StatusCode::INSUFFICIENT_STORAGE),
            (LabError::Storage("lock".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn test_error_response_status() {
        let response = ApiError(LabError::not_found("turn", "t1")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
