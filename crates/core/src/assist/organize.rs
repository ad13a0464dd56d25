//! Structural reorganization of a prompt.

use super::client::{ChatRequest, ModelClient};
use super::extract::extract_json;
use super::prompts;
use crate::error::LabResult;
use serde::{Deserialize, Serialize};

/// Reorganized prompt plus what changed and what conflicts remain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub organized: String,
    #[serde(default)]
    pub changes: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
}

pub fn build_request(prompt: &str) -> ChatRequest {
    ChatRequest::new(prompts::render(prompts::ORGANIZE, &[("prompt", prompt)]))
}

pub async fn reorganize(client: &dyn ModelClient, prompt: &str) -> LabResult<Organization> {
    let text = client.complete(build_request(prompt)).await?;
    let organization: Organization = extract_json(&text)?;
    tracing::info!(
        changes = organization.changes.len(),
        conflicts = organization.conflicts.len(),
        "Prompt reorganized"
    );
    Ok(organization)
}
