//! # Export
//!
//! Renders the current prompt, its history and the conversation into
//! shareable formats.

use super::app_state::ApplicationState;
use super::conversation::{ConversationLog, Feedback, Role};
use super::versions::PromptVersion;
use crate::error::{LabError, LabResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Json,
    Text,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Json => "json",
            ExportFormat::Text => "text",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(ExportFormat::Markdown),
            "json" => Some(ExportFormat::Json),
            "text" | "txt" => Some(ExportFormat::Text),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Json => "application/json",
            ExportFormat::Text => "text/plain",
        }
    }

    /// Suggested download name, dated
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        let stem = match self {
            ExportFormat::Json => "system-prompt-export",
            _ => "system-prompt",
        };
        format!("{}-{}.{}", stem, at.format("%Y-%m-%d"), self.extension())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedVersion<'a> {
    content: &'a str,
    timestamp: DateTime<Utc>,
    reason: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedTurn<'a> {
    role: Role,
    content: &'a str,
    timestamp: DateTime<Utc>,
    feedback: Option<Feedback>,
    annotation: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportStats {
    total_messages: usize,
    total_versions: usize,
    positive_feedback: usize,
    negative_feedback: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    exported_at: DateTime<Utc>,
    current_prompt: &'a str,
    versions: Vec<ExportedVersion<'a>>,
    conversations: Vec<ExportedTurn<'a>>,
    stats: ExportStats,
}

/// Active prompt followed by the version history, newest first
pub fn to_markdown(prompt: &str, versions: &[PromptVersion], at: DateTime<Utc>) -> String {
    let mut markdown = String::from("# System Prompt\n\n");
    markdown.push_str(&format!("**Created:** {}\n\n", at.format("%Y-%m-%d")));
    markdown.push_str("---\n\n## Active Prompt\n\n");
    markdown.push_str(&format!("```\n{}\n```\n\n", prompt));

    if !versions.is_empty() {
        markdown.push_str("---\n\n## Version History\n\n");
        let total = versions.len();
        for (index, version) in versions.iter().rev().enumerate() {
            markdown.push_str(&format!("### Version {}\n", total - index));
            markdown.push_str(&format!(
                "**Date:** {}\n",
                version.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            if let Some(reason) = &version.reason {
                markdown.push_str(&format!("**Change:** {}\n", reason));
            }
            markdown.push_str(&format!("\n```\n{}\n```\n\n", version.content));
        }
    }

    markdown
}

pub fn to_json(
    prompt: &str,
    versions: &[PromptVersion],
    conversation: &ConversationLog,
    at: DateTime<Utc>,
) -> LabResult<String> {
    let turns = conversation.turns();
    let feedback = conversation.stats();

    let document = ExportDocument {
        exported_at: at,
        current_prompt: prompt,
        versions: versions
            .iter()
            .map(|v| ExportedVersion {
                content: &v.content,
                timestamp: v.created_at,
                reason: v.reason.as_deref(),
            })
            .collect(),
        conversations: turns
            .iter()
            .map(|t| ExportedTurn {
                role: t.role,
                content: &t.content,
                timestamp: t.created_at,
                feedback: t.feedback,
                annotation: t.annotation.as_deref(),
            })
            .collect(),
        stats: ExportStats {
            total_messages: feedback.total_messages,
            total_versions: versions.len(),
            positive_feedback: feedback.positive_feedback,
            negative_feedback: feedback.negative_feedback,
        },
    };

    serde_json::to_string_pretty(&document).map_err(LabError::from)
}

/// Render the whole application state in `format`
pub fn export(state: &ApplicationState, format: ExportFormat, at: DateTime<Utc>) -> LabResult<String> {
    let prompt = state.current_prompt();
    let versions = state.versions().list();

    let rendered = match format {
        ExportFormat::Markdown => to_markdown(prompt, versions, at),
        ExportFormat::Json => to_json(prompt, versions, state.conversation(), at)?,
        ExportFormat::Text => prompt.to_string(),
    };

    tracing::debug!(format = format.as_str(), bytes = rendered.len(), "Exported prompt");
    Ok(rendered)
}
