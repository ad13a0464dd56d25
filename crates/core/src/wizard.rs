//! # Prompt Wizard
//!
//! Deterministic, local composition of a prompt from wizard selections.
//! No model call is involved.

use crate::catalog::{self, BOT_TYPES, FEATURES, PLATFORMS, TONES};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardSelections {
    pub industry: String,
    pub bot_type: String,
    pub tone: String,
    pub platforms: Vec<String>,
    pub features: Vec<String>,
    pub custom_requirements: String,
}

/// Platform-specific style hints
fn platform_hints(platform: &str) -> &'static [&'static str] {
    match platform {
        "whatsapp" => &["Keep messages short and to the point", "Avoid unnecessary blank lines"],
        "instagram" => &["Be warm and engagement-oriented", "Respect the DM character limit"],
        _ => &[],
    }
}

fn feature_rule(feature: &str) -> Option<&'static str> {
    match feature {
        "gdpr" => Some("**GDPR:** Never store personal data and never ask for sensitive information."),
        "multilang" => Some("**Multilingual:** Detect the user's language and answer in the same language."),
        "emoji" => Some("**Emoji:** Enrich messages with fitting emoji. 😊"),
        "appointment" => Some("**Appointments:** Check availability and start the booking steps."),
        "recommendations" => Some("**Recommendations:** Suggest relevant products based on the user's needs."),
        "pricing" => Some("**Pricing:** Give price ranges only and point to the website for current prices."),
        _ => None,
    }
}

/// Build the prompt text for the given selections
pub fn compose(selections: &WizardSelections) -> String {
    let industry = catalog::industry(&selections.industry);
    let mut prompt = industry.base_prompt.to_string();

    // Identity
    if let Some(bot) = catalog::option(BOT_TYPES, &selections.bot_type) {
        prompt.push_str(&format!(
            "\n\nYour primary role is to serve as a **{}** ({}).",
            bot.name,
            bot.detail.to_lowercase()
        ));
    }

    // Tone and platforms
    prompt.push_str("\n\n## 💬 Communication Style\n");
    if let Some(tone) = catalog::option(TONES, &selections.tone) {
        prompt.push_str(&format!("- **Tone:** {}\n", tone.name));
        prompt.push_str(&format!("- **Example:** {}\n", tone.detail));
    }

    let platforms: Vec<&str> = selections
        .platforms
        .iter()
        .filter_map(|p| catalog::option(PLATFORMS, p).map(|o| o.name))
        .collect();
    if !platforms.is_empty() {
        prompt.push_str(&format!("- **Platforms:** {}\n", platforms.join(", ")));
        for hint in selections.platforms.iter().flat_map(|p| platform_hints(p)) {
            prompt.push_str(&format!("- {}\n", hint));
        }
    }

    // Rules
    prompt.push_str("\n## 🚫 Rules and Boundaries\n");
    for rule in industry.default_rules {
        prompt.push_str(&format!("- {}\n", rule));
    }

    let features: Vec<&str> = selections
        .features
        .iter()
        .filter(|f| catalog::option(FEATURES, f).is_some())
        .filter_map(|f| feature_rule(f))
        .collect();
    if !features.is_empty() {
        prompt.push_str("\n## 🚀 Capabilities\n");
        for rule in features {
            prompt.push_str(&format!("- {}\n", rule));
        }
    }

    let custom = selections.custom_requirements.trim();
    if !custom.is_empty() {
        prompt.push_str("\n## 🛠️ Custom Requirements\n");
        let lines: Vec<String> = custom
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| format!("- {}", l.trim()))
            .collect();
        prompt.push_str(&lines.join("\n"));
        prompt.push('\n');
    }

    if !industry.example_dialogues.is_empty() {
        prompt.push_str("\n## 📋 Example Dialogues\n");
        for dialogue in industry.example_dialogues {
            prompt.push_str(&format!("\n---\n{}\n", dialogue));
        }
    }

    prompt.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selections() -> WizardSelections {
        WizardSelections {
            industry: "ecommerce".into(),
            bot_type: "sales".into(),
            tone: "friendly".into(),
            platforms: vec!["whatsapp".into(), "webchat".into()],
            features: vec!["gdpr".into(), "emoji".into(), "bogus".into()],
            custom_requirements: "Mention the loyalty program\n\nOffer gift wrapping".into(),
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        assert_eq!(compose(&selections()), compose(&selections()));
    }

    #[test]
    fn test_compose_sections() {
        let prompt = compose(&selections());

        assert!(prompt.starts_with("# E-commerce Customer Service Assistant"));
        assert!(prompt.contains("**Sales Assistant**"));
        assert!(prompt.contains("- **Tone:** Friendly"));
        assert!(prompt.contains("- **Platforms:** WhatsApp, Web Chat"));
        assert!(prompt.contains("- Keep messages short and to the point"));
        assert!(prompt.contains("Never promise discounts"));
        assert!(prompt.contains("**GDPR:**"));
        assert!(prompt.contains("- Mention the loyalty program\n- Offer gift wrapping"));
        assert!(prompt.contains("## 📋 Example Dialogues"));
    }

    #[test]
    fn test_minimal_selection_uses_general_industry() {
        let prompt = compose(&WizardSelections::default());
        assert!(prompt.starts_with("# General Purpose Assistant"));
        assert!(!prompt.contains("Capabilities"));
        assert!(!prompt.contains("Example Dialogues"));
    }
}
