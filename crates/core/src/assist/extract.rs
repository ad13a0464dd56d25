//! # Structured Extraction
//!
//! Stage two of a collaborator call: pull the embedded JSON object out of
//! loosely formatted model text and deserialize it.

use crate::error::{LabError, LabResult};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*\n(.*?)\n\s*```").expect("valid regex"));

static WHOLE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n(.*?)\n\s*```\s*$").expect("valid regex")
});

/// The JSON text inside `text`: a ```json fence if present, otherwise the
/// span from the first `{` to the last `}`
pub fn json_span(text: &str) -> Option<&str> {
    if let Some(inner) = FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        return Some(inner.as_str());
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Deserialize the embedded object or fail with `MalformedResponse`
pub fn extract_json<T: DeserializeOwned>(text: &str) -> LabResult<T> {
    let span = json_span(text)
        .ok_or_else(|| LabError::MalformedResponse("no JSON object in response".into()))?;

    serde_json::from_str(span).map_err(|e| {
        tracing::warn!(error = %e, "Model response did not match the expected shape");
        LabError::MalformedResponse(e.to_string())
    })
}

/// Remove a wrapping code fence, if the whole text is one
pub fn strip_code_fences(text: &str) -> String {
    match WHOLE_FENCE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim().to_string(),
        None => text.trim().to_string(),
    }
}
