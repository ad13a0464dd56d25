//! Instruction templates bundled at compile time.
//!
//! Placeholders are written `{{name}}` and filled by [`render`].

/// Feedback-driven prompt optimization
pub const OPTIMIZE: &str = include_str!("defaults/optimize.md");

/// Structural reorganization without content changes
pub const ORGANIZE: &str = include_str!("defaults/organize.md");

/// Ten-category quality scoring with suggestions
pub const ANALYZE: &str = include_str!("defaults/analyze.md");

/// Prompt authoring from questionnaire answers
pub const GENERATE: &str = include_str!("defaults/generate.md");

/// All templates with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("optimize", OPTIMIZE),
        ("organize", ORGANIZE),
        ("analyze", ANALYZE),
        ("generate", GENERATE),
    ]
}

/// Substitute every `{{key}}` with its value
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{{{}}}}}", key), value)
    })
}
