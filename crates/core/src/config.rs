//! # Configuration
//!
//! `LabConfig` lives at `<runtime>/config.json`. Missing or unreadable
//! files fall back to defaults; partial updates are merged field by field.

use crate::error::{LabError, LabResult};
use crate::models::{LlmProvider, ModelConfig};
use crate::state::io;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_PROMPT: &str = "You are a helpful assistant. Answer clearly and concisely.";

/// Runtime settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LabConfig {
    pub model: ModelConfig,
    /// Largest single value the store accepts before reporting degradation
    pub storage_quota_bytes: usize,
    /// Content kept per knowledge document on a degraded write
    pub knowledge_truncate_chars: usize,
    /// Pause before each scenario message after the first
    pub scenario_delay_secs: u64,
    /// Turns sent along with an optimization request
    pub history_window: usize,
    /// Prompt used when nothing has been stored yet
    pub default_prompt: String,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            storage_quota_bytes: 5 * 1024 * 1024,
            knowledge_truncate_chars: 1000,
            scenario_delay_secs: 3,
            history_window: 5,
            default_prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// Partial update, every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_quota_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_truncate_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_delay_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_prompt: Option<String>,
}

impl LabConfig {
    /// Load from `root/config.json`, defaults when absent or invalid
    pub async fn load(root: &Path) -> Self {
        match io::read_optional(root, CONFIG_FILE).await {
            Ok(Some(content)) => match serde_json::from_str::<LabConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub async fn save(&self, root: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        io::write_file(root, CONFIG_FILE, &content).await?;
        Ok(())
    }

    pub fn merge(&mut self, update: ConfigUpdate) {
        if let Some(provider) = update.provider {
            if provider != self.model.provider && update.model.is_none() {
                self.model.model = provider.default_model().to_string();
            }
            self.model.provider = provider;
        }
        if let Some(model) = update.model {
            self.model.model = model;
        }
        if update.base_url.is_some() {
            self.model.base_url = update.base_url.filter(|u| !u.is_empty());
        }
        if let Some(quota) = update.storage_quota_bytes {
            self.storage_quota_bytes = quota;
        }
        if let Some(chars) = update.knowledge_truncate_chars {
            self.knowledge_truncate_chars = chars;
        }
        if let Some(secs) = update.scenario_delay_secs {
            self.scenario_delay_secs = secs;
        }
        if let Some(window) = update.history_window {
            self.history_window = window;
        }
        if let Some(prompt) = update.default_prompt {
            self.default_prompt = prompt;
        }
    }

    pub fn validate(&self) -> LabResult<()> {
        if self.model.model.trim().is_empty() {
            return Err(LabError::UnsupportedInput("model name must not be empty".into()));
        }
        if self.storage_quota_bytes == 0 {
            return Err(LabError::UnsupportedInput("storage quota must be positive".into()));
        }
        if self.knowledge_truncate_chars == 0 {
            return Err(LabError::UnsupportedInput(
                "knowledge truncate length must be positive".into(),
            ));
        }
        if self.model.base_url.is_some() && !self.model.provider.supports_base_url() {
            return Err(LabError::UnsupportedInput(format!(
                "{} does not accept a custom base URL",
                self.model.provider.display_name()
            )));
        }
        Ok(())
    }
}
