//! # Conversation Log
//!
//! Ordered chat turns of the current prompt epoch plus per-turn feedback.
//! The whole log is emptied whenever the prompt changes.

use super::store::{keys, Store};
use crate::assist::ChatMessage;
use crate::error::{LabError, LabResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// User rating of an assistant reply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Good,
    Bad,
}

/// A single chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    /// Free text explaining a `bad` rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl ConversationTurn {
    fn new(role: Role, content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
            feedback: None,
            annotation: None,
        }
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Feedback totals, used by exports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    pub total_messages: usize,
    pub positive_feedback: usize,
    pub negative_feedback: usize,
}

/// Owner of the turn sequence
pub struct ConversationLog {
    store: Store,
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn load(store: Store) -> Self {
        let turns = store.get(keys::MESSAGES, Vec::new());
        Self { store, turns }
    }

    pub fn append(&mut self, role: Role, content: &str) -> ConversationTurn {
        let turn = ConversationTurn::new(role, content);
        self.turns.push(turn.clone());
        self.persist();
        turn
    }

    /// Overwrites feedback and annotation. Returns false if the turn is absent.
    pub fn set_feedback(&mut self, turn_id: &str, feedback: Feedback, annotation: Option<&str>) -> bool {
        let Some(turn) = self.turns.iter_mut().find(|t| t.id == turn_id) else {
            tracing::debug!(turn_id = %turn_id, "Feedback for unknown turn ignored");
            return false;
        };

        turn.feedback = Some(feedback);
        turn.annotation = annotation.map(str::to_string);
        self.persist();
        true
    }

    /// Idempotent
    pub fn clear(&mut self) {
        self.turns.clear();
        self.persist();
    }

    /// Nearest `user` turn before the given turn
    pub fn find_preceding_user_turn(&self, turn_id: &str) -> LabResult<&ConversationTurn> {
        let position = self
            .position(turn_id)
            .ok_or_else(|| LabError::not_found("turn", turn_id))?;

        self.turns[..position]
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .ok_or_else(|| LabError::not_found("preceding user turn", turn_id))
    }

    pub fn position(&self, turn_id: &str) -> Option<usize> {
        self.turns.iter().position(|t| t.id == turn_id)
    }

    pub fn get(&self, turn_id: &str) -> Option<&ConversationTurn> {
        self.turns.iter().find(|t| t.id == turn_id)
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns `[0, end)` as role/content pairs
    pub fn history_before(&self, end: usize) -> Vec<ChatMessage> {
        self.turns[..end.min(self.turns.len())]
            .iter()
            .map(ConversationTurn::to_message)
            .collect()
    }

    pub fn stats(&self) -> FeedbackStats {
        FeedbackStats {
            total_messages: self.turns.len(),
            positive_feedback: self
                .turns
                .iter()
                .filter(|t| t.feedback == Some(Feedback::Good))
                .count(),
            negative_feedback: self
                .turns
                .iter()
                .filter(|t| t.feedback == Some(Feedback::Bad))
                .count(),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.set(keys::MESSAGES, &self.turns) {
            tracing::warn!(error = %e, "Failed to persist conversation");
        }
    }
}
