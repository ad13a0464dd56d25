//! # Model Client
//!
//! Stage one of every collaborator call: send instructions plus history,
//! get raw text back. Structured results are extracted separately.

use super::gemini::GeminiClient;
use super::openai::OpenAiClient;
use crate::error::{LabError, LabResult};
use crate::models::{LlmProvider, ModelConfig};
use crate::state::Role;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A prior turn re-expressed for the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One round trip to the hosted model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub system_instruction: Option<String>,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }
}

/// Raw text completion against a hosted model
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Any failure (auth, network, empty reply) is `LabError::Provider`
    async fn complete(&self, request: ChatRequest) -> LabResult<String>;

    fn model_name(&self) -> &str;
}

/// Build a client for the configured provider.
///
/// The explicit key wins over the provider's environment variable.
pub fn build_client(config: &ModelConfig, api_key: Option<&str>) -> LabResult<Arc<dyn ModelClient>> {
    let key = api_key
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(config.provider.env_var()).ok())
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            LabError::Provider(format!(
                "AI not initialized: set an API key or {}",
                config.provider.env_var()
            ))
        })?;

    tracing::debug!(provider = %config.provider.as_str(), model = %config.model, "Building model client");

    let client: Arc<dyn ModelClient> = match config.provider {
        LlmProvider::Gemini => Arc::new(GeminiClient::new(key, &config.model)),
        LlmProvider::OpenAI => {
            let client = OpenAiClient::new(key, &config.model);
            match &config.base_url {
                Some(url) => Arc::new(client.with_base_url(url)),
                None => Arc::new(client),
            }
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::new("hi")
            .with_system_instruction("be brief")
            .with_history(vec![ChatMessage::user("a"), ChatMessage::assistant("b")]);

        assert_eq!(request.message, "hi");
        assert_eq!(request.system_instruction.as_deref(), Some("be brief"));
        assert_eq!(request.history[1].role, Role::Assistant);
    }

    #[test]
    fn test_build_client_with_explicit_key() {
        let config = ModelConfig::default();
        let client = build_client(&config, Some("test-key")).unwrap();
        assert_eq!(client.model_name(), "gemini-2.5-pro");

        let config = ModelConfig::with_provider(LlmProvider::OpenAI, "gpt-4o")
            .with_base_url("http://localhost:8000/v1");
        let client = build_client(&config, Some("test-key")).unwrap();
        assert_eq!(client.model_name(), "gpt-4o");
    }

    #[test]
    fn test_blank_key_is_provider_error() {
        if std::env::var("GEMINI_API_KEY").is_err() {
            let err = build_client(&ModelConfig::default(), Some("  ")).err().unwrap();
            assert!(matches!(err, LabError::Provider(_)));
        }
    }
}
