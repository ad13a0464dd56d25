//! # State
//!
//! Persistent prompt state: the key-value store, the version ledger, the
//! conversation log, the knowledge corpus and the coordinator that keeps
//! them consistent.

pub mod app_state;
pub mod conversation;
pub mod db;
pub mod export;
pub mod fallback;
pub mod io;
pub mod knowledge;
pub mod store;
pub mod versions;

pub use db::LabDb;

pub use app_state::{ApplicationState, ChatOutcome, OptimizationTicket, PendingChat, PendingSuggestion};
pub use conversation::{ConversationLog, ConversationTurn, Feedback, FeedbackStats, Role};
pub use export::{export, ExportFormat};
pub use fallback::{FallbackWriter, WriteOutcome};
pub use knowledge::{
    BatchReport, DocumentParser, DocumentType, KnowledgeCorpus, KnowledgeDocument, PlainTextParser,
    SkippedUpload, Upload,
};
pub use store::{keys, KeyValueBackend, MemoryBackend, SqliteBackend, Store};
pub use versions::{PromptVersion, VersionLedger, MAX_VERSIONS};
