//! Keyword-picked stock replies.
//!
//! Used when the rule chain has nothing to say and no LLM is available, or
//! when the configured LLM key is a test key.

use regex::Regex;
use std::sync::LazyLock;

pub const GREETING: &str = "Hello! I'm the PG&E Substation Operations Assistant. How can I help you with substation operations today?";
pub const DEFAULT: &str = "I understand your question about PG&E substations. As the Substation Operations Assistant, I can help with asset health, maintenance procedures, inspection reports, and safety protocols. What specific information do you need?";
pub const MAINTENANCE: &str = "For substation maintenance, we follow standard procedures including visual inspection, thermal scanning, oil sampling, and testing of protection devices. Would you like more information about a specific maintenance procedure?";
pub const SAFETY: &str = "Safety is our top priority. When working in substations, always use proper PPE, follow lockout/tagout procedures, maintain minimum approach distances, and never work alone. Do you need specific safety guidelines?";
pub const ASSET_HEALTH: &str = "Asset health monitoring includes regular diagnostics of transformers, circuit breakers, and switchgear. We track parameters like oil quality, temperature, and load levels. Which asset are you inquiring about?";
pub const INSPECTIONS: &str = "Inspection reports are documented in our system with details on findings, recommendations, and compliance status. You can look up recent reports by asset ID or substation location. Do you need a specific report?";

static GREETING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(hello|hi|hey)\b").expect("greeting word pattern"));

const RULES: &[(&[&str], &str)] = &[
    (&["maintenance", "repair", "work order", "fix", "transformer"], MAINTENANCE),
    (&["safety", "protocol", "accident", "procedure", "guidelines"], SAFETY),
    (&["asset", "health", "condition", "diagnostic", "status"], ASSET_HEALTH),
    (&["inspection", "report", "audit", "check"], INSPECTIONS),
];

/// Pick a stock reply for `message`.
pub fn reply(message: &str) -> &'static str {
    let q = message.to_lowercase();
    if GREETING_WORD.is_match(&q) {
        return GREETING;
    }
    RULES
        .iter()
        .find(|(words, _)| words.iter().any(|w| q.contains(w)))
        .map(|(_, text)| *text)
        .unwrap_or(DEFAULT)
}
