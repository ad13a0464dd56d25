//! # Quality Analysis
//!
//! Ten-category scoring and actionable suggestions for a prompt. Applying
//! a suggestion is pure text composition; the caller decides whether the
//! result becomes the new prompt.

use super::client::{ChatRequest, ModelClient};
use super::extract::extract_json;
use super::prompts;
use crate::error::LabResult;
use serde::{Deserialize, Serialize};

/// Detected context of the analyzed prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisContext {
    pub industry: String,
    pub bot_type: String,
    pub language: String,
    pub target_audience: String,
    pub complexity: String,
}

/// Per-category scores (0-100 each) and their sum
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub identity: u32,
    pub tasks: u32,
    pub rules: u32,
    pub tone: u32,
    pub error_handling: u32,
    pub examples: u32,
    pub security: u32,
    pub readability: u32,
    pub consistency: u32,
    pub completeness: u32,
    pub total: u32,
}

impl CategoryScores {
    pub fn categories(&self) -> [(&'static str, u32); 10] {
        [
            ("identity", self.identity),
            ("tasks", self.tasks),
            ("rules", self.rules),
            ("tone", self.tone),
            ("errorHandling", self.error_handling),
            ("examples", self.examples),
            ("security", self.security),
            ("readability", self.readability),
            ("consistency", self.consistency),
            ("completeness", self.completeness),
        ]
    }

    pub fn sum(&self) -> u32 {
        self.categories().iter().map(|(_, s)| s).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Important,
    Recommended,
}

impl Severity {
    /// Application order, most urgent first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Important => 1,
            Self::Recommended => 2,
        }
    }
}

/// Where a suggestion's content belongs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Start,
    Rules,
    Examples,
    Errors,
    #[default]
    #[serde(other)]
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub severity: Severity,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub reasoning: String,
    pub content_to_add: String,
    #[serde(default)]
    pub insert_position: InsertPosition,
}

impl Suggestion {
    /// `start` prepends; every other position appends after a blank line
    pub fn apply_to(&self, prompt: &str) -> String {
        match self.insert_position {
            InsertPosition::Start => format!("{}\n\n{}", self.content_to_add, prompt),
            _ => format!("{}\n\n{}", prompt, self.content_to_add),
        }
    }

    /// Ledger reason recorded when this suggestion is applied
    pub fn reason(&self) -> String {
        format!("Applied: {}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAnalysis {
    #[serde(default)]
    pub context: AnalysisContext,
    pub scores: CategoryScores,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
}

impl QualityAnalysis {
    /// Fill missing suggestion ids and a missing total
    fn normalize(mut self) -> Self {
        for (idx, suggestion) in self.suggestions.iter_mut().enumerate() {
            if suggestion.id.trim().is_empty() {
                suggestion.id = format!("suggestion-{}", idx + 1);
            }
        }
        if self.scores.total == 0 {
            self.scores.total = self.scores.sum();
        }
        self
    }
}

/// Stable sort: critical, then important, then recommended
pub fn sort_by_severity(suggestions: &mut [Suggestion]) {
    suggestions.sort_by_key(|s| s.severity.rank());
}

pub fn build_request(prompt: &str) -> ChatRequest {
    ChatRequest::new(prompts::render(prompts::ANALYZE, &[("prompt", prompt)]))
}

pub async fn analyze_quality(client: &dyn ModelClient, prompt: &str) -> LabResult<QualityAnalysis> {
    let text = client.complete(build_request(prompt)).await?;
    let analysis = extract_json::<QualityAnalysis>(&text)?.normalize();
    tracing::info!(
        total = analysis.scores.total,
        suggestions = analysis.suggestions.len(),
        "Prompt analyzed"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assist::mock::MockModelClient;
    use crate::error::LabError;

    const REPLY: &str = r###"```json
{
  "context": {"industry": "E-commerce", "botType": "Support", "language": "English",
              "targetAudience": "B2C", "complexity": "medium"},
  "scores": {"identity": 80, "tasks": 70, "rules": 60, "tone": 75, "errorHandling": 30,
             "examples": 20, "security": 40, "readability": 80, "consistency": 65,
             "completeness": 55, "total": 575},
  "suggestions": [
    {"title": "Add examples", "severity": "recommended", "contentToAdd": "## Examples",
     "insertPosition": "examples"},
    {"id": "x", "title": "No prices", "severity": "critical", "category": "rules",
     "reasoning": "Prices change", "contentToAdd": "Never promise prices",
     "insertPosition": "rules"}
  ],
  "gaps": ["errors"],
  "strengths": ["identity"]
}
```"###;

    fn suggestion(title: &str, severity: Severity, position: InsertPosition) -> Suggestion {
        Suggestion {
            id: title.to_string(),
            title: title.to_string(),
            severity,
            category: String::new(),
            reasoning: String::new(),
            content_to_add: format!("[{}]", title),
            insert_position: position,
        }
    }

    #[tokio::test]
    async fn test_analysis_parsed_and_normalized() {
        let client = MockModelClient::new().reply(REPLY);
        let analysis = analyze_quality(&client, "prompt").await.unwrap();

        assert_eq!(analysis.context.bot_type, "Support");
        assert_eq!(analysis.scores.error_handling, 30);
        assert_eq!(analysis.suggestions[0].id, "suggestion-1");
        assert_eq!(analysis.suggestions[1].id, "x");
        assert_eq!(analysis.suggestions[1].insert_position, InsertPosition::Rules);
    }

    #[tokio::test]
    async fn test_missing_scores_is_malformed() {
        let client = MockModelClient::new().reply(r#"{"suggestions": []}"#);
        assert!(matches!(
            analyze_quality(&client, "p").await,
            Err(LabError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_total_filled_when_missing() {
        let scores = CategoryScores {
            identity: 10,
            tasks: 20,
            ..Default::default()
        };
        let analysis = QualityAnalysis {
            context: AnalysisContext::default(),
            scores,
            suggestions: vec![],
            gaps: vec![],
            strengths: vec![],
        }
        .normalize();
        assert_eq!(analysis.scores.total, 30);
    }

    #[test]
    fn test_unknown_position_appends() {
        let parsed: Suggestion = serde_json::from_str(
            r#"{"title":"t","severity":"important","contentToAdd":"c","insertPosition":"middle"}"#,
        )
        .unwrap();
        assert_eq!(parsed.insert_position, InsertPosition::End);
        assert_eq!(parsed.apply_to("p"), "p\n\nc");
    }

    #[test]
    fn test_apply_start_prepends() {
        let s = suggestion("Disclaimer", Severity::Critical, InsertPosition::Start);
        assert_eq!(s.apply_to("Body"), "[Disclaimer]\n\nBody");
        assert_eq!(s.reason(), "Applied: Disclaimer");
    }

    #[test]
    fn test_sort_by_severity_is_stable() {
        let mut list = vec![
            suggestion("r1", Severity::Recommended, InsertPosition::End),
            suggestion("c1", Severity::Critical, InsertPosition::End),
            suggestion("i1", Severity::Important, InsertPosition::End),
            suggestion("c2", Severity::Critical, InsertPosition::End),
        ];
        sort_by_severity(&mut list);
        let order: Vec<&str> = list.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(order, vec!["c1", "c2", "i1", "r1"]);
    }
}
