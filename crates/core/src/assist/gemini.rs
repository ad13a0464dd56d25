//! Gemini REST client (`generateContent`).

use super::client::{ChatRequest, ModelClient};
use crate::error::{LabError, LabResult};
use crate::state::Role;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn build_body(request: &ChatRequest) -> GenerateContentRequest {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|msg| Content::text(gemini_role(msg.role), &msg.content))
            .collect();
        contents.push(Content::text("user", &request.message));

        GenerateContentRequest {
            contents,
            system_instruction: request
                .system_instruction
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| Content::text("system", s)),
        }
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn complete(&self, request: ChatRequest) -> LabResult<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );
        let body = Self::build_body(&request);

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| LabError::Provider(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| LabError::Provider(format!("Failed to parse Gemini response: {err}")))?;

        extract_text_response(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> LabResult<String> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LabError::Provider(
            "Gemini API returned no text in the response candidates".into(),
        ));
    }
    Ok(text)
}

fn map_http_error(status: StatusCode, body: String) -> LabError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    tracing::warn!(status = status.as_u16(), "Gemini API error");
    LabError::Provider(format!("Gemini API error ({}): {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::ChatMessage;

    #[test]
    fn test_body_maps_roles_and_appends_message() {
        let request = ChatRequest::new("third")
            .with_system_instruction("be brief")
            .with_history(vec![ChatMessage::user("first"), ChatMessage::assistant("second")]);

        let json = serde_json::to_value(GeminiClient::build_body(&request)).unwrap();
        let roles: Vec<&str> = json["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap())
            .collect();

        assert_eq!(roles, vec!["user", "model", "user"]);
        assert_eq!(json["contents"][2]["parts"][0]["text"], "third");
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn test_empty_system_instruction_omitted() {
        let request = ChatRequest::new("hi").with_system_instruction("  ");
        let json = serde_json::to_value(GeminiClient::build_body(&request)).unwrap();
        assert!(json.get("system_instruction").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "Hello");
    }

    #[test]
    fn test_no_candidates_is_provider_error() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(extract_text_response(response), Err(LabError::Provider(_))));
    }

    #[test]
    fn test_http_error_uses_provider_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body.to_string());
        assert_eq!(
            err.to_string(),
            "provider error: Gemini API error (400): INVALID_ARGUMENT: API key not valid"
        );
    }
}
