//! # Application State
//!
//! The single owner of the current prompt. Every accepted prompt change goes
//! through [`ApplicationState::set_prompt`], which records a snapshot and
//! empties the conversation in the same step.
//!
//! Model calls are never made from here. Flows that need one are split into
//! a `prepare_*` step that captures what the call needs and a commit step
//! that applies the result, so a caller can release its lock in between.

use super::conversation::{ConversationLog, ConversationTurn, Feedback, Role};
use super::db::LabDb;
use super::fallback::FallbackWriter;
use super::knowledge::KnowledgeCorpus;
use super::store::{keys, Store};
use super::versions::{PromptVersion, VersionLedger};
use crate::assist::{sort_by_severity, ChatMessage, ChatRequest, FlaggedExchange, Optimization, Suggestion};
use crate::catalog;
use crate::config::LabConfig;
use crate::error::{LabError, LabResult};
use crate::wizard::{self, WizardSelections};

/// Staging slot for an AI-produced candidate prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PendingSuggestion {
    #[default]
    Empty,
    Staged(Optimization),
}

/// A chat send waiting for the model
#[derive(Debug, Clone)]
pub struct PendingChat {
    pub request: ChatRequest,
    epoch: u64,
}

/// Everything an optimization call needs, captured under the lock
#[derive(Debug, Clone)]
pub struct OptimizationTicket {
    pub current_prompt: String,
    pub history: Vec<ChatMessage>,
    pub flagged: FlaggedExchange,
}

/// Outcome of committing a chat reply
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Replied(ConversationTurn),
    /// The prompt or conversation changed while the call was in flight
    Discarded,
}

pub struct ApplicationState {
    store: Store,
    config: LabConfig,
    current_prompt: String,
    ledger: VersionLedger,
    conversation: ConversationLog,
    knowledge: KnowledgeCorpus,
    pending: PendingSuggestion,
    api_key: Option<String>,
    /// Bumped whenever the conversation is invalidated
    epoch: u64,
}

impl ApplicationState {
    /// Rehydrate everything from the store
    pub fn load(store: Store, config: LabConfig) -> Self {
        let current_prompt: Option<String> = store.get(keys::CURRENT_PROMPT, None);
        let current_prompt = current_prompt.unwrap_or_else(|| config.default_prompt.clone());
        let api_key: Option<String> = store.get(keys::API_KEY, None);

        let writer = FallbackWriter::new(config.knowledge_truncate_chars);
        let state = Self {
            ledger: VersionLedger::load(store.clone()),
            conversation: ConversationLog::load(store.clone()),
            knowledge: KnowledgeCorpus::load(store.clone(), writer),
            store,
            config,
            current_prompt,
            pending: PendingSuggestion::Empty,
            api_key,
            epoch: 0,
        };

        tracing::info!(
            versions = state.ledger.len(),
            turns = state.conversation.len(),
            documents = state.knowledge.len(),
            "Application state loaded"
        );
        state
    }

    /// State over the shared SQLite database, honoring the configured quota
    pub fn open(db: &LabDb, config: LabConfig) -> Self {
        let store = Store::sqlite(db, Some(config.storage_quota_bytes));
        Self::load(store, config)
    }

    pub fn in_memory(config: LabConfig) -> Self {
        Self::load(Store::in_memory(), config)
    }

    // ---- read access ----

    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    pub fn versions(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn knowledge(&self) -> &KnowledgeCorpus {
        &self.knowledge
    }

    pub fn knowledge_mut(&mut self) -> &mut KnowledgeCorpus {
        &mut self.knowledge
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn pending(&self) -> Option<&Optimization> {
        match &self.pending {
            PendingSuggestion::Staged(candidate) => Some(candidate),
            PendingSuggestion::Empty => None,
        }
    }

    /// Prompt plus the knowledge block, as sent to the chat model
    pub fn enriched_prompt(&self) -> String {
        let context = self.knowledge.combined_context();
        if context.is_empty() {
            self.current_prompt.clone()
        } else {
            format!("{}\n\n{}", self.current_prompt, context)
        }
    }

    // ---- prompt mutation ----

    /// The only path that replaces the prompt with new content
    pub fn set_prompt(&mut self, content: &str, reason: Option<&str>) -> PromptVersion {
        let version = self.ledger.record_snapshot(content, reason);
        self.invalidate_conversation();
        self.current_prompt = content.to_string();
        self.persist_prompt();

        tracing::info!(version_id = %version.id, reason = ?reason, "Prompt updated");
        version
    }

    /// Restore a snapshot. Neither clears the conversation nor records a new
    /// version.
    pub fn revert_to_version(&mut self, version_id: &str) -> LabResult<&str> {
        let content = self.ledger.revert(version_id)?;
        self.current_prompt = content;
        self.persist_prompt();

        tracing::info!(version_id = %version_id, "Reverted to prompt version");
        Ok(&self.current_prompt)
    }

    pub fn update_config(&mut self, config: LabConfig) {
        self.config = config;
    }

    // ---- pending suggestion ----

    /// Stage a raw candidate, or clear the slot with `None`. A candidate that
    /// does not parse is reported and leaves the slot as it was.
    pub fn stage_pending_suggestion(&mut self, candidate: Option<&str>) -> LabResult<()> {
        match candidate {
            None => {
                self.pending = PendingSuggestion::Empty;
                Ok(())
            }
            Some(raw) => {
                let optimization = Optimization::parse(raw).inspect_err(|e| {
                    tracing::warn!(error = %e, "Rejected unparseable suggestion");
                })?;
                self.stage_optimization(optimization);
                Ok(())
            }
        }
    }

    /// Last write wins
    pub fn stage_optimization(&mut self, optimization: Optimization) {
        if matches!(self.pending, PendingSuggestion::Staged(_)) {
            tracing::debug!("Replacing staged suggestion");
        }
        self.pending = PendingSuggestion::Staged(optimization);
    }

    pub fn accept_pending(&mut self) -> LabResult<PromptVersion> {
        match std::mem::take(&mut self.pending) {
            PendingSuggestion::Staged(candidate) => {
                Ok(self.set_prompt(&candidate.optimized_prompt, Some(&candidate.explanation)))
            }
            PendingSuggestion::Empty => Err(LabError::not_found("pending suggestion", "staged")),
        }
    }

    /// Returns whether anything was staged
    pub fn reject_pending(&mut self) -> bool {
        let was_staged = matches!(self.pending, PendingSuggestion::Staged(_));
        self.pending = PendingSuggestion::Empty;
        was_staged
    }

    // ---- conversation ----

    pub fn record_turn(&mut self, role: Role, content: &str) -> ConversationTurn {
        self.conversation.append(role, content)
    }

    pub fn set_turn_feedback(&mut self, turn_id: &str, feedback: Feedback, annotation: Option<&str>) -> bool {
        self.conversation.set_feedback(turn_id, feedback, annotation)
    }

    pub fn clear_conversation(&mut self) {
        self.invalidate_conversation();
    }

    fn invalidate_conversation(&mut self) {
        self.conversation.clear();
        self.epoch += 1;
    }

    /// Record the user turn and build the request from the turns before it
    pub fn prepare_chat(&mut self, text: &str) -> PendingChat {
        let history = self.conversation.history_before(self.conversation.len());
        self.record_turn(Role::User, text);

        PendingChat {
            request: ChatRequest::new(text)
                .with_system_instruction(self.enriched_prompt())
                .with_history(history),
            epoch: self.epoch,
        }
    }

    /// Append the reply, or an `Error: ...` turn on failure. Replies that
    /// belong to an invalidated conversation are dropped.
    pub fn finish_chat(&mut self, pending: &PendingChat, result: LabResult<String>) -> LabResult<ChatOutcome> {
        if pending.epoch != self.epoch {
            tracing::info!("Discarding reply for a conversation that no longer exists");
            return match result {
                Ok(_) => Ok(ChatOutcome::Discarded),
                Err(e) => Err(e),
            };
        }

        match result {
            Ok(reply) => Ok(ChatOutcome::Replied(self.record_turn(Role::Assistant, &reply))),
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.record_turn(Role::Assistant, &format!("Error: {}", e));
                Err(e)
            }
        }
    }

    /// Mark the reply bad and capture the exchange for optimization
    pub fn prepare_optimization(&mut self, assistant_turn_id: &str, annotation: Option<&str>) -> LabResult<OptimizationTicket> {
        let assistant = self
            .conversation
            .get(assistant_turn_id)
            .cloned()
            .ok_or_else(|| LabError::not_found("turn", assistant_turn_id))?;

        // The rating sticks even when there is no exchange to optimize
        self.set_turn_feedback(assistant_turn_id, Feedback::Bad, annotation);
        let user = self.conversation.find_preceding_user_turn(assistant_turn_id)?.clone();

        let end = self.conversation.position(&user.id).unwrap_or(0);
        let start = end.saturating_sub(self.config.history_window);
        let history = self.conversation.history_before(end).split_off(start);

        Ok(OptimizationTicket {
            current_prompt: self.current_prompt.clone(),
            history,
            flagged: FlaggedExchange {
                user_text: user.content,
                assistant_text: assistant.content,
                annotation: annotation.map(str::to_string),
            },
        })
    }

    // ---- authoring aids ----

    pub fn save_manual_edit(&mut self, content: &str) -> PromptVersion {
        self.set_prompt(content, Some("Manual edit"))
    }

    pub fn accept_organization(&mut self, organized: &str) -> PromptVersion {
        self.set_prompt(organized, Some("Smart organize"))
    }

    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> PromptVersion {
        let updated = suggestion.apply_to(&self.current_prompt);
        self.set_prompt(&updated, Some(&suggestion.reason()))
    }

    /// One version per suggestion, most severe first
    pub fn apply_all_suggestions(&mut self, mut suggestions: Vec<Suggestion>) -> Vec<PromptVersion> {
        sort_by_severity(&mut suggestions);
        suggestions.iter().map(|s| self.apply_suggestion(s)).collect()
    }

    pub fn adopt_generated(&mut self, prompt: &str) -> PromptVersion {
        self.set_prompt(prompt, Some("AI generated"))
    }

    pub fn apply_wizard(&mut self, selections: &WizardSelections) -> PromptVersion {
        self.set_prompt(&wizard::compose(selections), Some("Wizard"))
    }

    pub fn select_template(&mut self, template_id: &str) -> LabResult<PromptVersion> {
        let template = catalog::template(template_id)?;
        Ok(self.set_prompt(template.prompt, Some(&format!("Template: {}", template.name))))
    }

    pub fn insert_component(&mut self, component_id: &str) -> LabResult<PromptVersion> {
        let component = catalog::component(component_id)?;
        let base = self.current_prompt.trim_end();
        let updated = if base.is_empty() {
            component.content.to_string()
        } else {
            format!("{}\n\n{}", base, component.content)
        };
        Ok(self.set_prompt(&updated, Some(&format!("Component: {}", component.name))))
    }

    // ---- API key ----

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn set_api_key(&mut self, key: Option<&str>) -> LabResult<()> {
        let key = key.map(str::trim).filter(|k| !k.is_empty());
        match key {
            Some(k) => self.store.set(keys::API_KEY, k)?,
            None => self.store.remove(keys::API_KEY)?,
        }
        self.api_key = key.map(str::to_string);
        Ok(())
    }

    fn persist_prompt(&self) {
        if let Err(e) = self.store.set(keys::CURRENT_PROMPT, &self.current_prompt) {
            tracing::warn!(error = %e, "Failed to persist current prompt");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::{InsertPosition, Severity};

    fn state_with_prompt(prompt: &str) -> ApplicationState {
        let config = LabConfig {
            default_prompt: prompt.to_string(),
            ..Default::default()
        };
        ApplicationState::in_memory(config)
    }

    fn suggestion(title: &str, severity: Severity, position: InsertPosition) -> Suggestion {
        Suggestion {
            id: title.into(),
            title: title.into(),
            severity,
            category: String::new(),
            reasoning: String::new(),
            content_to_add: title.to_uppercase(),
            insert_position: position,
        }
    }

    #[test]
    fn test_set_prompt_snapshots_and_updates() {
        let mut state = state_with_prompt("P0");
        state.set_prompt("P1", Some("edit"));

        assert_eq!(state.current_prompt(), "P1");
        let contents: Vec<&str> = state.versions().list().iter().map(|v| v.content.as_str()).collect();
        assert_eq!(contents, vec!["P1"]);
        assert_eq!(state.versions().head().unwrap().reason.as_deref(), Some("edit"));
    }

    #[test]
    fn test_set_prompt_clears_conversation() {
        let mut state = state_with_prompt("P0");
        state.record_turn(Role::User, "hi");
        state.record_turn(Role::Assistant, "hello");

        state.set_prompt("P1", None);
        assert!(state.conversation().is_empty());
    }

    #[test]
    fn test_revert_keeps_conversation_and_ledger() {
        let mut state = state_with_prompt("P0");
        let v1 = state.set_prompt("P1", None);
        state.set_prompt("P2", None);
        state.record_turn(Role::User, "hi");

        assert_eq!(state.revert_to_version(&v1.id).unwrap(), "P1");
        assert_eq!(state.current_prompt(), "P1");
        assert_eq!(state.conversation().len(), 1);
        assert_eq!(state.versions().len(), 2);
    }

    #[test]
    fn test_revert_unknown_changes_nothing() {
        let mut state = state_with_prompt("P0");
        state.set_prompt("P1", None);

        assert!(matches!(
            state.revert_to_version("missing"),
            Err(LabError::NotFound { .. })
        ));
        assert_eq!(state.current_prompt(), "P1");
        assert_eq!(state.versions().len(), 1);
    }

    #[test]
    fn test_stage_twice_keeps_last() {
        let mut state = state_with_prompt("P0");
        state
            .stage_pending_suggestion(Some(r#"{"optimizedPrompt":"A","explanation":"first"}"#))
            .unwrap();
        state
            .stage_pending_suggestion(Some(r#"{"optimizedPrompt":"B","explanation":"second"}"#))
            .unwrap();

        assert_eq!(state.pending().unwrap().optimized_prompt, "B");
    }

    #[test]
    fn test_stage_malformed_leaves_slot() {
        let mut state = state_with_prompt("P0");
        assert!(matches!(
            state.stage_pending_suggestion(Some("not json")),
            Err(LabError::MalformedResponse(_))
        ));
        assert!(state.pending().is_none());

        state
            .stage_pending_suggestion(Some(r#"{"optimizedPrompt":"A","explanation":"x"}"#))
            .unwrap();
        assert!(state.stage_pending_suggestion(Some("{}")).is_err());
        assert_eq!(state.pending().unwrap().optimized_prompt, "A");

        state.stage_pending_suggestion(None).unwrap();
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_accept_pending_goes_through_set_prompt() {
        let mut state = state_with_prompt("P0");
        state.record_turn(Role::User, "hi");
        state.stage_optimization(Optimization {
            optimized_prompt: "Better".into(),
            explanation: "Tone fix".into(),
        });

        let version = state.accept_pending().unwrap();
        assert_eq!(version.reason.as_deref(), Some("Tone fix"));
        assert_eq!(state.current_prompt(), "Better");
        assert!(state.conversation().is_empty());
        assert!(state.pending().is_none());

        assert!(state.accept_pending().is_err());
    }

    #[test]
    fn test_reject_pending() {
        let mut state = state_with_prompt("P0");
        assert!(!state.reject_pending());

        state.stage_optimization(Optimization {
            optimized_prompt: "X".into(),
            explanation: "Y".into(),
        });
        assert!(state.reject_pending());
        assert!(state.pending().is_none());
        assert_eq!(state.current_prompt(), "P0");
        assert!(state.versions().is_empty());
    }

    #[test]
    fn test_chat_round_trip() {
        let mut state = state_with_prompt("Be brief.");
        state.record_turn(Role::User, "earlier");
        state.record_turn(Role::Assistant, "reply");

        let pending = state.prepare_chat("now");
        assert_eq!(pending.request.history.len(), 2);
        assert_eq!(pending.request.system_instruction.as_deref(), Some("Be brief."));
        assert_eq!(state.conversation().len(), 3);

        let outcome = state.finish_chat(&pending, Ok("ok".into())).unwrap();
        assert!(matches!(outcome, ChatOutcome::Replied(ref t) if t.content == "ok"));
        assert_eq!(state.conversation().turns()[3].role, Role::Assistant);
    }

    #[test]
    fn test_chat_failure_records_error_turn() {
        let mut state = state_with_prompt("P0");
        let pending = state.prepare_chat("hi");

        let err = state
            .finish_chat(&pending, Err(LabError::Provider("quota".into())))
            .unwrap_err();
        assert!(err.is_retryable());

        let last = state.conversation().turns().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Error: provider error: quota");
    }

    #[test]
    fn test_reply_after_prompt_change_is_discarded() {
        let mut state = state_with_prompt("P0");
        let pending = state.prepare_chat("hi");
        state.set_prompt("P1", None);

        let outcome = state.finish_chat(&pending, Ok("late".into())).unwrap();
        assert_eq!(outcome, ChatOutcome::Discarded);
        assert!(state.conversation().is_empty());
    }

    #[test]
    fn test_knowledge_enriches_prompt() {
        use crate::state::knowledge::KnowledgeDocument;

        let mut state = state_with_prompt("Base");
        assert_eq!(state.enriched_prompt(), "Base");

        let doc = KnowledgeDocument::from_upload("faq.txt", 3, "abc".into()).unwrap();
        state.knowledge_mut().add(doc).unwrap();
        let enriched = state.enriched_prompt();
        assert!(enriched.starts_with("Base\n\n\n\n=== KNOWLEDGE BASE ==="));
        assert!(enriched.contains("--- faq.txt (plain-text) ---\nabc"));
    }

    #[test]
    fn test_prepare_optimization_window() {
        let mut state = state_with_prompt("P0");
        for i in 0..4 {
            state.record_turn(Role::User, &format!("q{}", i));
            state.record_turn(Role::Assistant, &format!("a{}", i));
        }
        let user = state.record_turn(Role::User, "last question");
        let reply = state.record_turn(Role::Assistant, "bad answer");

        let ticket = state.prepare_optimization(&reply.id, Some("too formal")).unwrap();

        assert_eq!(ticket.flagged.user_text, user.content);
        assert_eq!(ticket.flagged.assistant_text, "bad answer");
        assert_eq!(ticket.history.len(), 5);
        assert_eq!(ticket.history[0].content, "a1");
        assert_eq!(ticket.history[4].content, "a3");

        let marked = state.conversation().get(&reply.id).unwrap();
        assert_eq!(marked.feedback, Some(Feedback::Bad));
        assert_eq!(marked.annotation.as_deref(), Some("too formal"));
    }

    #[test]
    fn test_prepare_optimization_without_user_turn() {
        let mut state = state_with_prompt("P0");
        let reply = state.record_turn(Role::Assistant, "unprompted");
        assert!(matches!(
            state.prepare_optimization(&reply.id, None),
            Err(LabError::NotFound { .. })
        ));
        let turn = state.conversation().get(&reply.id).unwrap();
        assert_eq!(turn.feedback, Some(Feedback::Bad));
    }

    #[test]
    fn test_apply_suggestion_positions() {
        let mut state = state_with_prompt("Body");
        state.apply_suggestion(&suggestion("top", Severity::Critical, InsertPosition::Start));
        assert_eq!(state.current_prompt(), "TOP\n\nBody");

        let version = state.apply_suggestion(&suggestion("tail", Severity::Important, InsertPosition::Rules));
        assert_eq!(state.current_prompt(), "TOP\n\nBody\n\nTAIL");
        assert_eq!(version.reason.as_deref(), Some("Applied: tail"));
    }

    #[test]
    fn test_apply_all_orders_by_severity() {
        let mut state = state_with_prompt("Body");
        let versions = state.apply_all_suggestions(vec![
            suggestion("rec", Severity::Recommended, InsertPosition::End),
            suggestion("crit", Severity::Critical, InsertPosition::End),
            suggestion("imp", Severity::Important, InsertPosition::End),
        ]);

        let reasons: Vec<&str> = versions.iter().filter_map(|v| v.reason.as_deref()).collect();
        assert_eq!(reasons, vec!["Applied: crit", "Applied: imp", "Applied: rec"]);
        assert_eq!(state.current_prompt(), "Body\n\nCRIT\n\nIMP\n\nREC");
        assert_eq!(state.versions().len(), 3);
    }

    #[test]
    fn test_template_component_and_wizard_reasons() {
        let mut state = state_with_prompt("P0");

        let v = state.select_template("healthcare").unwrap();
        assert_eq!(v.reason.as_deref(), Some("Template: Clinic Information Assistant"));

        let v = state.insert_component("tone-friendly").unwrap();
        assert_eq!(v.reason.as_deref(), Some("Component: Friendly"));
        assert!(state.current_prompt().ends_with(catalog::component("tone-friendly").unwrap().content));

        let v = state.apply_wizard(&WizardSelections::default());
        assert_eq!(v.reason.as_deref(), Some("Wizard"));

        assert!(state.select_template("missing").is_err());
        assert_eq!(state.versions().len(), 3);
    }

    #[test]
    fn test_generated_and_organized_reasons() {
        let mut state = state_with_prompt("P0");
        assert_eq!(state.adopt_generated("G").reason.as_deref(), Some("AI generated"));
        assert_eq!(state.accept_organization("O").reason.as_deref(), Some("Smart organize"));
        assert_eq!(state.save_manual_edit("M").reason.as_deref(), Some("Manual edit"));
    }

    #[test]
    fn test_state_survives_reload() {
        let store = Store::in_memory();
        let mut state = ApplicationState::load(store.clone(), LabConfig::default());
        state.set_prompt("P1", Some("edit"));
        state.record_turn(Role::User, "hi");
        state.set_api_key(Some(" key-123 ")).unwrap();

        let reloaded = ApplicationState::load(store, LabConfig::default());
        assert_eq!(reloaded.current_prompt(), "P1");
        assert_eq!(reloaded.versions().list(), state.versions().list());
        assert_eq!(reloaded.conversation().turns(), state.conversation().turns());
        assert_eq!(reloaded.api_key(), Some("key-123"));
    }

    #[test]
    fn test_fresh_state_uses_default_prompt() {
        let state = ApplicationState::in_memory(LabConfig::default());
        assert_eq!(state.current_prompt(), crate::config::DEFAULT_PROMPT);
        assert!(state.versions().is_empty());
    }
}
