//! # Degraded Writes
//!
//! Retry-with-fallback strategy for values that may outgrow the store:
//! write as-is, then retry once with a degraded copy, then give up and
//! keep the in-memory state unpersisted.

use super::store::Store;
use serde::Serialize;

/// A value that can produce a smaller copy of itself
pub trait Degradable {
    fn degraded(&self, max_chars: usize) -> Self;
}

/// What happened to a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Stored as-is
    Written,
    /// Stored after degradation
    Degraded,
    /// Nothing stored; in-memory state is ahead of the store
    Dropped,
}

/// One-retry truncating writer
#[derive(Debug, Clone, Copy)]
pub struct FallbackWriter {
    max_chars: usize,
}

impl FallbackWriter {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn write<T: Serialize + Degradable>(&self, store: &Store, key: &str, value: &T) -> WriteOutcome {
        let first = match store.set(key, value) {
            Ok(()) => return WriteOutcome::Written,
            Err(e) => e,
        };

        tracing::warn!(key = %key, error = %first, "Write failed, retrying with truncated content");

        match store.set(key, &value.degraded(self.max_chars)) {
            Ok(()) => WriteOutcome::Degraded,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Degraded write failed, state left unpersisted");
                WriteOutcome::Dropped
            }
        }
    }
}

/// Truncate to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryBackend;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Note(String);

    impl Degradable for Note {
        fn degraded(&self, max_chars: usize) -> Self {
            Note(truncate_chars(&self.0, max_chars))
        }
    }

    fn store_with_quota(quota: usize) -> Store {
        Store::new(Arc::new(MemoryBackend::new().with_quota(quota)))
    }

    #[test]
    fn test_small_value_written() {
        let store = store_with_quota(1024);
        let outcome = FallbackWriter::new(4).write(&store, "k", &Note("hello".into()));
        assert_eq!(outcome, WriteOutcome::Written);
        assert_eq!(store.get("k", Note(String::new())), Note("hello".into()));
    }

    #[test]
    fn test_large_value_degraded_once() {
        let store = store_with_quota(16);
        let outcome = FallbackWriter::new(4).write(&store, "k", &Note("x".repeat(100)));
        assert_eq!(outcome, WriteOutcome::Degraded);
        assert_eq!(store.get("k", Note(String::new())), Note("xxxx".into()));
    }

    #[test]
    fn test_still_too_large_is_dropped() {
        let store = store_with_quota(4);
        let outcome = FallbackWriter::new(50).write(&store, "k", &Note("x".repeat(100)));
        assert_eq!(outcome, WriteOutcome::Dropped);
        assert_eq!(store.get("k", Note("none".into())), Note("none".into()));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("", 3), "");
    }
}
