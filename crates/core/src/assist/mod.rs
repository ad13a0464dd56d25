//! # Model Collaborators
//!
//! Every AI-assisted feature is one round trip: a raw text completion
//! ([`ModelClient`]) followed by strict extraction into a typed result
//! ([`extract`]). Extraction never touches the network.

pub mod analyze;
pub mod client;
pub mod extract;
pub mod gemini;
pub mod generate;
pub mod openai;
pub mod optimize;
pub mod organize;
pub mod prompts;

#[cfg(test)]
pub mod mock;

pub use analyze::{
    analyze_quality, sort_by_severity, AnalysisContext, CategoryScores, InsertPosition,
    QualityAnalysis, Severity, Suggestion,
};
pub use client::{build_client, ChatMessage, ChatRequest, ModelClient};
pub use gemini::GeminiClient;
pub use generate::{generate_from_answers, GeneratorAnswers};
pub use openai::OpenAiClient;
pub use optimize::{optimize_from_feedback, FlaggedExchange, Optimization};
pub use organize::{reorganize, Organization};
