// Shared prompt constants and prompt-building utilities.
// Each feature that needs generative calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

use crate::models::profile::Profile;

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Persona shared by every guidance prompt.
pub const COUNSELOR_PERSONA: &str = "You are a career guidance expert for Indian students.";

/// Renders the student attributes every guidance prompt embeds.
pub fn render_profile_block(profile: &Profile) -> String {
    format!(
        "STUDENT PROFILE:\n\
        - Class: {}\n\
        - Stream: {}\n\
        - Age: {}\n\
        - Gender: {}\n\
        - Language: {}\n\
        - Budget: {}\n\
        - Reservation Category: {}\n\
        - Mobility: {}\n\
        - Location: {}, {}",
        profile.class_level,
        profile.stream.as_deref().unwrap_or("Not specified"),
        profile.age,
        profile.gender,
        profile.language_preference,
        profile.budget_range,
        profile.reservation_category,
        profile.mobility,
        profile.location.city,
        profile.location.state,
    )
}

/// Substitutes `{name}` placeholders in a single pass.
///
/// Inserted values are never rescanned, so student-supplied text that happens
/// to contain `{placeholder}` reaches the model verbatim. Braces that do not
/// name a known placeholder (JSON examples in templates) are left as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
