//! # PromptLab Core
//!
//! Everything behind the prompt editor: versioned prompt state, the chat
//! log, the knowledge corpus and the model-backed authoring aids.
//!
//! ## Architecture
//!
//! - `state/` - Store, version ledger, conversation log, knowledge corpus, coordinator
//! - `assist/` - Model clients and the optimize/organize/analyze/generate collaborators
//! - `session` - Async flows that combine state with a model client
//! - `catalog` / `wizard` - Built-in templates, components, scenarios and local prompt composition
//! - `models` / `config` - Provider selection and runtime settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! use promptlab_core::{assist, session, ApplicationState, LabConfig};
//! use tokio::sync::Mutex;
//!
//! let config = LabConfig::default();
//! let client = assist::build_client(&config.model, None)?;
//! let state = Mutex::new(ApplicationState::in_memory(config));
//! session::send_message(&state, client.as_ref(), "Hello").await?;
//! ```

pub mod assist;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod wizard;

pub use config::{ConfigUpdate, LabConfig};
pub use error::{LabError, LabResult};
pub use models::{LlmProvider, ModelConfig};
pub use state::{ApplicationState, LabDb, Store};
