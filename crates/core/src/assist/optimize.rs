//! Feedback-driven prompt optimization.

use super::client::{ChatMessage, ChatRequest, ModelClient};
use super::extract::extract_json;
use super::prompts;
use crate::error::{LabError, LabResult};
use serde::{Deserialize, Serialize};

/// Candidate prompt produced from negative feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub optimized_prompt: String,
    pub explanation: String,
}

impl Optimization {
    /// Parse a candidate from model text or a raw JSON string
    pub fn parse(text: &str) -> LabResult<Self> {
        let optimization: Optimization = extract_json(text)?;
        if optimization.optimized_prompt.trim().is_empty() {
            return Err(LabError::MalformedResponse("optimizedPrompt is empty".into()));
        }
        Ok(optimization)
    }
}

/// The exchange the user flagged as bad
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedExchange {
    pub user_text: String,
    pub assistant_text: String,
    pub annotation: Option<String>,
}

pub fn build_request(current_prompt: &str, history: &[ChatMessage], flagged: &FlaggedExchange) -> ChatRequest {
    let history_text = history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n");

    let annotation = flagged
        .annotation
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .map(|a| format!("User note: {}", a))
        .unwrap_or_default();

    ChatRequest::new(prompts::render(
        prompts::OPTIMIZE,
        &[
            ("current_prompt", current_prompt),
            ("history", &history_text),
            ("user_text", &flagged.user_text),
            ("assistant_text", &flagged.assistant_text),
            ("annotation", &annotation),
        ],
    ))
}

/// `history` should already be limited to the recent window
pub async fn optimize_from_feedback(
    client: &dyn ModelClient,
    current_prompt: &str,
    history: &[ChatMessage],
    flagged: &FlaggedExchange,
) -> LabResult<Optimization> {
    let text = client
        .complete(build_request(current_prompt, history, flagged))
        .await?;
    Optimization::parse(&text)
}
