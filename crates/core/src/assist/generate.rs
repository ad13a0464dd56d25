//! Prompt generation from questionnaire answers.

use super::client::{ChatRequest, ModelClient};
use super::extract::strip_code_fences;
use super::prompts;
use crate::error::{LabError, LabResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorAnswers {
    pub bot_type: String,
    pub industry: String,
    pub main_goals: String,
    pub tone: String,
    pub constraints: String,
    pub additional_info: String,
}

pub fn build_request(answers: &GeneratorAnswers) -> ChatRequest {
    ChatRequest::new(prompts::render(
        prompts::GENERATE,
        &[
            ("bot_type", &answers.bot_type),
            ("industry", &answers.industry),
            ("main_goals", &answers.main_goals),
            ("tone", &answers.tone),
            ("constraints", &answers.constraints),
            ("additional_info", &answers.additional_info),
        ],
    ))
}

/// Plain prompt text, no JSON envelope
pub async fn generate_from_answers(client: &dyn ModelClient, answers: &GeneratorAnswers) -> LabResult<String> {
    if answers.bot_type.trim().is_empty() || answers.main_goals.trim().is_empty() {
        return Err(LabError::UnsupportedInput(
            "bot type and main goals are required".into(),
        ));
    }

    let text = client.complete(build_request(answers)).await?;
    let prompt = strip_code_fences(&text);
    if prompt.is_empty() {
        return Err(LabError::MalformedResponse("generated prompt is empty".into()));
    }
    Ok(prompt)
}
