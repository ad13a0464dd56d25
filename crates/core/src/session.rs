//! # Session
//!
//! Async flows that pair the shared [`ApplicationState`] with a
//! [`ModelClient`]. Each flow takes the lock to capture its inputs, drops
//! it for the model call, then takes it again to commit.

use crate::assist::{
    analyze_quality, generate_from_answers, optimize_from_feedback, reorganize, GeneratorAnswers,
    ModelClient, Optimization, Organization, QualityAnalysis,
};
use crate::catalog::TestScenario;
use crate::error::LabResult;
use crate::state::{ApplicationState, ChatOutcome};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;

/// Send one user message and record the reply.
///
/// A failed call still leaves an `Error: ...` assistant turn in the log
/// and the error is returned so the caller can offer a retry.
pub async fn send_message(
    state: &Mutex<ApplicationState>,
    client: &dyn ModelClient,
    text: &str,
) -> LabResult<ChatOutcome> {
    let pending = state.lock().await.prepare_chat(text);

    tracing::debug!(
        model = client.model_name(),
        history = pending.request.history.len(),
        "Sending chat message"
    );
    let result = client.complete(pending.request.clone()).await;

    state.lock().await.finish_chat(&pending, result)
}

/// Per-message result of a scenario run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub sent: usize,
    pub replied: usize,
    pub failed: usize,
    pub discarded: usize,
}

/// Send every scenario question in order, pausing before each one after
/// the first. Failures are recorded and the run continues.
pub async fn run_scenario(
    state: &Mutex<ApplicationState>,
    client: &dyn ModelClient,
    scenario: &TestScenario,
) -> ScenarioReport {
    let delay = Duration::from_secs(state.lock().await.config().scenario_delay_secs);
    let mut report = ScenarioReport::default();

    tracing::info!(scenario = scenario.id, questions = scenario.questions.len(), "Running test scenario");

    for (index, question) in scenario.questions.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        report.sent += 1;
        match send_message(state, client, question).await {
            Ok(ChatOutcome::Replied(_)) => report.replied += 1,
            Ok(ChatOutcome::Discarded) => report.discarded += 1,
            Err(e) => {
                tracing::warn!(scenario = scenario.id, index, error = %e, "Scenario message failed");
                report.failed += 1;
            }
        }
    }

    report
}

/// Mark an assistant reply as bad and stage the model's rewrite of the
/// prompt. On failure the staged suggestion is left as it was.
pub async fn request_optimization(
    state: &Mutex<ApplicationState>,
    client: &dyn ModelClient,
    assistant_turn_id: &str,
    annotation: Option<&str>,
) -> LabResult<Optimization> {
    let ticket = state.lock().await.prepare_optimization(assistant_turn_id, annotation)?;

    let optimization = optimize_from_feedback(client, &ticket.current_prompt, &ticket.history, &ticket.flagged)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Optimization failed"))?;

    state.lock().await.stage_optimization(optimization.clone());
    tracing::info!(turn_id = %assistant_turn_id, "Optimization staged");
    Ok(optimization)
}

/// Restructured prompt for review. Nothing changes until the caller
/// accepts it.
pub async fn organize(state: &Mutex<ApplicationState>, client: &dyn ModelClient) -> LabResult<Organization> {
    let prompt = state.lock().await.current_prompt().to_string();
    reorganize(client, &prompt).await
}

pub async fn analyze(state: &Mutex<ApplicationState>, client: &dyn ModelClient) -> LabResult<QualityAnalysis> {
    let prompt = state.lock().await.current_prompt().to_string();
    analyze_quality(client, &prompt).await
}

pub async fn generate(client: &dyn ModelClient, answers: &GeneratorAnswers) -> LabResult<String> {
    generate_from_answers(client, answers).await
}
