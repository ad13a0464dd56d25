//! # Version Ledger
//!
//! Bounded, ordered history of prompt snapshots. A snapshot is taken on
//! every accepted prompt change; once more than [`MAX_VERSIONS`] exist the
//! oldest are evicted. Reverting only reads a snapshot back; it never adds
//! one.

use super::store::{keys, Store};
use crate::error::{LabError, LabResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger capacity
pub const MAX_VERSIONS: usize = 10;

/// An immutable snapshot of the prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptVersion {
    /// Unique snapshot ID
    pub id: String,
    /// Full prompt text at the time of the snapshot
    pub content: String,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
    /// Human-readable cause of the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PromptVersion {
    fn new(content: &str, reason: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            reason: reason.map(str::to_string),
        }
    }
}

/// Owner of the snapshot sequence (oldest first)
pub struct VersionLedger {
    store: Store,
    versions: Vec<PromptVersion>,
}

impl VersionLedger {
    /// Rehydrate from the store
    pub fn load(store: Store) -> Self {
        let mut versions: Vec<PromptVersion> = store.get(keys::PROMPT_VERSIONS, Vec::new());
        if versions.len() > MAX_VERSIONS {
            let excess = versions.len() - MAX_VERSIONS;
            versions.drain(..excess);
        }
        Self { store, versions }
    }

    /// Append a snapshot, evicting the oldest entries beyond capacity
    pub fn record_snapshot(&mut self, content: &str, reason: Option<&str>) -> PromptVersion {
        let version = PromptVersion::new(content, reason);
        self.versions.push(version.clone());

        if self.versions.len() > MAX_VERSIONS {
            let excess = self.versions.len() - MAX_VERSIONS;
            let evicted: Vec<_> = self.versions.drain(..excess).collect();
            for old in &evicted {
                tracing::debug!(version_id = %old.id, "Evicted oldest prompt version");
            }
        }

        self.persist();
        tracing::info!(version_id = %version.id, reason = ?reason, "Prompt snapshot recorded");

        version
    }

    /// Content of the snapshot with `version_id`. No mutation either way.
    pub fn revert(&self, version_id: &str) -> LabResult<String> {
        self.get(version_id)
            .map(|v| v.content.clone())
            .ok_or_else(|| LabError::not_found("version", version_id))
    }

    /// Insertion order, oldest first
    pub fn list(&self) -> &[PromptVersion] {
        &self.versions
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &PromptVersion> {
        self.versions.iter().rev()
    }

    pub fn head(&self) -> Option<&PromptVersion> {
        self.versions.last()
    }

    pub fn get(&self, version_id: &str) -> Option<&PromptVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    fn persist(&self) {
        if let Err(e) = self.store.set(keys::PROMPT_VERSIONS, &self.versions) {
            tracing::warn!(error = %e, "Failed to persist prompt versions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_snapshot_appends() {
        let mut ledger = VersionLedger::load(Store::in_memory());
        let v = ledger.record_snapshot("P1", Some("edit"));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.head().unwrap().id, v.id);
        assert_eq!(v.content, "P1");
        assert_eq!(v.reason.as_deref(), Some("edit"));
    }

    #[test]
    fn test_eleven_snapshots_keep_last_ten() {
        let mut ledger = VersionLedger::load(Store::in_memory());
        for i in 1..=11 {
            ledger.record_snapshot(&format!("v{}", i), None);
        }

        let contents: Vec<&str> = ledger.list().iter().map(|v| v.content.as_str()).collect();
        let expected: Vec<String> = (2..=11).map(|i| format!("v{}", i)).collect();
        assert_eq!(contents, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut ledger = VersionLedger::load(Store::in_memory());
        for i in 0..37 {
            ledger.record_snapshot(&i.to_string(), None);
            assert!(ledger.len() <= MAX_VERSIONS);
        }
        assert_eq!(ledger.list().first().unwrap().content, "27");
        assert_eq!(ledger.head().unwrap().content, "36");
    }

    #[test]
    fn test_revert_unknown_id_is_not_found() {
        let mut ledger = VersionLedger::load(Store::in_memory());
        ledger.record_snapshot("P1", None);

        let err = ledger.revert("missing").unwrap_err();
        assert!(matches!(err, LabError::NotFound { kind: "version", .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_revert_does_not_add_snapshot() {
        let mut ledger = VersionLedger::load(Store::in_memory());
        let first = ledger.record_snapshot("P1", None);
        ledger.record_snapshot("P2", None);

        assert_eq!(ledger.revert(&first.id).unwrap(), "P1");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_persist_and_reload() {
        let store = Store::in_memory();
        let mut ledger = VersionLedger::load(store.clone());
        ledger.record_snapshot("P1", Some("template"));
        ledger.record_snapshot("P2", None);

        let reloaded = VersionLedger::load(store);
        assert_eq!(reloaded.list(), ledger.list());
        assert_eq!(reloaded.list()[0].reason.as_deref(), Some("template"));
    }

    #[test]
    fn test_newest_first() {
        let mut ledger = VersionLedger::load(Store::in_memory());
        ledger.record_snapshot("a", None);
        ledger.record_snapshot("b", None);

        let order: Vec<&str> = ledger.newest_first().map(|v| v.content.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
