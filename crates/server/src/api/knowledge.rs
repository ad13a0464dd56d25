//! # Knowledge API
//!
//! Documents whose text is appended to the prompt during chat.

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    routing::{delete, get},
    Json, Router,
};
use promptlab_core::state::knowledge::{format_size, FILE_SIZE_LIMIT};
use promptlab_core::state::{BatchReport, KnowledgeDocument, PlainTextParser, Upload};
use promptlab_core::LabError;
use serde::{Deserialize, Serialize};

use super::{ApiResponse, ApiResult};
use crate::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeResponse {
    pub documents: Vec<KnowledgeDocument>,
    pub total_size: u64,
    pub total_size_label: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadFile {
    pub name: String,
    /// File text as read by the client
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
}

/// Request body cap for an upload batch. Room for several files at the
/// per-file limit; anything larger per file is skipped by the corpus.
pub const UPLOAD_BODY_LIMIT: usize = 4 * FILE_SIZE_LIMIT as usize;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_documents).post(upload_documents).delete(clear_documents))
        .route("/:id", delete(remove_document))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

async fn list_documents(State(state): State<SharedState>) -> Json<KnowledgeResponse> {
    let lab = state.lab.lock().await;
    let total_size = lab.knowledge().total_size();
    Json(KnowledgeResponse {
        documents: lab.knowledge().documents().to_vec(),
        total_size,
        total_size_label: format_size(total_size),
    })
}

/// Invalid files are skipped and reported; the rest are added
async fn upload_documents(
    State(state): State<SharedState>,
    Json(req): Json<UploadRequest>,
) -> Json<BatchReport> {
    let uploads = req
        .files
        .into_iter()
        .map(|f| Upload {
            name: f.name,
            bytes: f.content.into_bytes(),
        })
        .collect();

    let mut lab = state.lab.lock().await;
    Json(lab.knowledge_mut().ingest_batch(uploads, &PlainTextParser))
}

async fn remove_document(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse>> {
    if !state.lab.lock().await.knowledge_mut().remove(&id) {
        return Err(LabError::not_found("document", id).into());
    }
    Ok(ApiResponse::ok("Document removed"))
}

async fn clear_documents(State(state): State<SharedState>) -> Json<ApiResponse> {
    state.lab.lock().await.knowledge_mut().clear();
    ApiResponse::ok("Knowledge base cleared")
}
