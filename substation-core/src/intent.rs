//! Deterministic intent classification.
//!
//! An ordered chain of keyword rules over the lowercased message; the first
//! rule that fires wins. Entities are pulled out alongside the intent.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::entity::{self, Entity};
use crate::records::{InspectionType, SensorKind};

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hi|hello|hey|greetings|howdy|hola)\b.{0,10}$").expect("greeting pattern")
});
static HISTORY_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:last|past|recent)\s*(\d+)").expect("limit pattern"));
static INVENTORY_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(inventory|spares?|parts?|stock|available)\b").expect("inventory pattern")
});
static SEARCH_NOUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(transformer|breaker|substation|maintenance|inspection|safety|part|temperature|voltage|load)\b",
    )
    .expect("search noun pattern")
});

/// Intent labels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Help,
    AssetHealth,
    MaintenanceSchedule,
    MaintenanceHistory,
    InspectionReport,
    PredictiveMaintenance,
    RealTimeData,
    SafetyGuidelines,
    TrainingMaterials,
    Incidents,
    Inventory,
    GeneralSearch,
    OffTopic,
}

impl Intent {
    pub const ALL: [Intent; 14] = [
        Intent::Greeting,
        Intent::Help,
        Intent::AssetHealth,
        Intent::MaintenanceSchedule,
        Intent::MaintenanceHistory,
        Intent::InspectionReport,
        Intent::PredictiveMaintenance,
        Intent::RealTimeData,
        Intent::SafetyGuidelines,
        Intent::TrainingMaterials,
        Intent::Incidents,
        Intent::Inventory,
        Intent::GeneralSearch,
        Intent::OffTopic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Help => "help",
            Intent::AssetHealth => "asset_health",
            Intent::MaintenanceSchedule => "maintenance_schedule",
            Intent::MaintenanceHistory => "maintenance_history",
            Intent::InspectionReport => "inspection_report",
            Intent::PredictiveMaintenance => "predictive_maintenance",
            Intent::RealTimeData => "real_time_data",
            Intent::SafetyGuidelines => "safety_guidelines",
            Intent::TrainingMaterials => "training_materials",
            Intent::Incidents => "incidents",
            Intent::Inventory => "inventory",
            Intent::GeneralSearch => "general_search",
            Intent::OffTopic => "off_topic",
        }
    }

    /// Intents answered from a fixed script rather than the dataset
    pub fn is_scripted(&self) -> bool {
        matches!(self, Intent::Greeting | Intent::Help | Intent::OffTopic)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    pub entity: Option<Entity>,
    /// Inspection type filter (inspection_report)
    pub inspection_type: Option<InspectionType>,
    /// Single sensor channel filter (real_time_data)
    pub sensor: Option<SensorKind>,
    /// Row limit (maintenance_history)
    pub limit: Option<usize>,
    /// Search terms (general_search)
    pub keywords: Option<String>,
}

impl Classification {
    fn new(intent: Intent, entity: Option<Entity>) -> Self {
        Self {
            intent,
            entity,
            inspection_type: None,
            sensor: None,
            limit: None,
            keywords: None,
        }
    }
}

fn contains_any(q: &str, words: &[&str]) -> bool {
    words.iter().any(|w| q.contains(w))
}

const HELP_PHRASES: &[&str] = &[
    "how do you work",
    "what can you do",
    "how to use",
    "help me",
    "what are your capabilities",
    "show me what you can do",
];

const DOMAIN_WORDS: &[&str] = &[
    "substation",
    "transformer",
    "breaker",
    "maintenance",
    "inspection",
    "asset",
    "equipment",
    "pg&e",
    "pge",
];

/// Classify a free-text message.
pub fn classify(message: &str) -> Classification {
    let q = message.trim().to_lowercase();

    // Greetings only when the message is little more than the greeting
    if GREETING.is_match(&q) {
        return Classification::new(Intent::Greeting, None);
    }

    if contains_any(&q, HELP_PHRASES)
        || (q.contains("what") && q.contains("information") && q.contains("provide"))
    {
        return Classification::new(Intent::Help, None);
    }

    let id = entity::extract_id(&q);

    // Training
    if contains_any(&q, &["training", "course", "manual", "tutorial", "certification"]) {
        return Classification::new(Intent::TrainingMaterials, entity::extract_topic(&q));
    }

    // Asset health / diagnostics
    if contains_any(&q, &["health", "status", "condition", "diagnostic"]) {
        return Classification::new(Intent::AssetHealth, id);
    }

    // Maintenance and work orders
    if contains_any(&q, &["maintenance", "work order", "scheduled"]) {
        if contains_any(&q, &["history", "past", "previous"]) {
            let mut c = Classification::new(Intent::MaintenanceHistory, id);
            c.limit = HISTORY_LIMIT
                .captures(&q)
                .and_then(|caps| caps[1].parse::<usize>().ok())
                .filter(|n| *n > 0);
            return c;
        }
        return Classification::new(Intent::MaintenanceSchedule, id);
    }

    // Inspection reports ("incident report" belongs to incidents)
    if q.contains("inspection") || (q.contains("report") && !q.contains("incident")) {
        let mut c = Classification::new(Intent::InspectionReport, id);
        c.inspection_type = if q.contains("infrared") {
            Some(InspectionType::Infrared)
        } else if q.contains("visual") {
            Some(InspectionType::Visual)
        } else if q.contains("ultrasonic") {
            Some(InspectionType::Ultrasonic)
        } else if q.contains("oil") {
            Some(InspectionType::OilAnalysis)
        } else {
            None
        };
        return c;
    }

    // Predictive maintenance
    if contains_any(&q, &["prediction", "predict", "recommend", "risk"]) {
        return Classification::new(Intent::PredictiveMaintenance, id);
    }

    // Real-time sensor data
    if contains_any(
        &q,
        &["real-time", "real time", "sensor", "voltage", "load", "temperature", "reading"],
    ) {
        let mut c = Classification::new(Intent::RealTimeData, id);
        let mentioned: Vec<SensorKind> = [SensorKind::Load, SensorKind::Voltage, SensorKind::Temperature]
            .into_iter()
            .filter(|k| q.contains(&k.label().to_lowercase()))
            .collect();
        if mentioned.len() == 1 {
            c.sensor = Some(mentioned[0]);
        }
        return c;
    }

    // Safety guidelines. "high voltage" never gets here: the real-time rule
    // takes "voltage" first, so that procedure is reachable only over REST.
    if contains_any(
        &q,
        &["safety", "ppe", "compliance", "procedure", "protocol", "guideline"],
    ) {
        let procedure = entity::extract_procedure(&q).or(id);
        return Classification::new(Intent::SafetyGuidelines, procedure);
    }

    // Incidents
    if contains_any(&q, &["incident", "failure", "accident", "outage", "fault"]) {
        return Classification::new(Intent::Incidents, id);
    }

    // Inventory / spare parts
    if INVENTORY_WORDS.is_match(&q) {
        return Classification::new(Intent::Inventory, id);
    }

    if id.is_none() && !contains_any(&q, DOMAIN_WORDS) {
        return Classification::new(Intent::OffTopic, None);
    }

    let nouns: Vec<&str> = SEARCH_NOUNS.find_iter(&q).map(|m| m.as_str()).collect();
    let keywords = if !nouns.is_empty() {
        nouns.join(" ")
    } else if let Some(e) = &id {
        e.id().to_string()
    } else {
        q.clone()
    };
    let mut c = Classification::new(Intent::GeneralSearch, id);
    c.keywords = Some(keywords);
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str) -> Option<Entity> {
        Some(Entity::Asset(id.to_string()))
    }

    #[test]
    fn test_greeting_only_for_short_messages() {
        assert_eq!(classify("Hello").intent, Intent::Greeting);
        assert_eq!(classify("hi there").intent, Intent::Greeting);
        assert_eq!(classify("  Hey!  ").intent, Intent::Greeting);
        assert_ne!(
            classify("hello, what is the health of transformer T-123").intent,
            Intent::Greeting
        );
        // "history" must not read as "hi"
        assert_ne!(classify("history").intent, Intent::Greeting);
    }

    #[test]
    fn test_help_phrases() {
        assert_eq!(classify("What can you do?").intent, Intent::Help);
        assert_eq!(
            classify("What information can you provide?").intent,
            Intent::Help
        );
    }

    #[test]
    fn test_asset_health_with_entity() {
        let c = classify("What is the health status of transformer T-123?");
        assert_eq!(c.intent, Intent::AssetHealth);
        assert_eq!(c.entity, asset("T-123"));
    }

    #[test]
    fn test_maintenance_history_vs_schedule() {
        let h = classify("Show the maintenance history for T-123, last 1");
        assert_eq!(h.intent, Intent::MaintenanceHistory);
        assert_eq!(h.entity, asset("T-123"));
        assert_eq!(h.limit, Some(1));

        let s = classify("Is there any scheduled maintenance for S-567?");
        assert_eq!(s.intent, Intent::MaintenanceSchedule);
        assert_eq!(s.entity, Some(Entity::Substation("S-567".to_string())));
        assert_eq!(s.limit, None);
    }

    #[test]
    fn test_inspection_type_extraction() {
        let c = classify("Any infrared inspection results for T-789?");
        assert_eq!(c.intent, Intent::InspectionReport);
        assert_eq!(c.inspection_type, Some(InspectionType::Infrared));
        assert_eq!(c.entity, asset("T-789"));
    }

    #[test]
    fn test_incident_report_is_not_inspection() {
        let c = classify("incident report for B-456");
        assert_eq!(c.intent, Intent::Incidents);
        assert_eq!(c.entity, asset("B-456"));
    }

    #[test]
    fn test_high_voltage_wording_goes_to_earlier_rules() {
        let c = classify("What PPE is needed for high voltage work?");
        assert_eq!(c.intent, Intent::RealTimeData);
        assert_eq!(c.sensor, Some(SensorKind::Voltage));

        let c = classify("safety guidelines for high voltage inspections");
        assert_eq!(c.intent, Intent::InspectionReport);

        assert_eq!(
            entity::extract_procedure("high voltage inspections"),
            Some(Entity::Procedure("High Voltage Inspections".to_string()))
        );
    }

    #[test]
    fn test_predictive() {
        assert_eq!(
            classify("What do you predict for T-789?").intent,
            Intent::PredictiveMaintenance
        );
    }

    #[test]
    fn test_real_time_sensor_filter() {
        let c = classify("What's the voltage at S-567?");
        assert_eq!(c.intent, Intent::RealTimeData);
        assert_eq!(c.sensor, Some(SensorKind::Voltage));

        let both = classify("load and temperature readings for s-567");
        assert_eq!(both.intent, Intent::RealTimeData);
        assert_eq!(both.sensor, None);
    }

    #[test]
    fn test_safety_procedure_entity() {
        let c = classify("Show me safety guidelines for breaker racking");
        assert_eq!(c.intent, Intent::SafetyGuidelines);
        assert_eq!(
            c.entity,
            Some(Entity::Procedure("Breaker Racking".to_string()))
        );

        let general = classify("what ppe do I need?");
        assert_eq!(general.intent, Intent::SafetyGuidelines);
        assert_eq!(general.entity, None);
    }

    #[test]
    fn test_training_topic() {
        let c = classify("Is there training on DGA interpretation?");
        assert_eq!(c.intent, Intent::TrainingMaterials);
        assert_eq!(c.entity, Some(Entity::Topic("DGA".to_string())));
    }

    #[test]
    fn test_inventory_words_are_whole_words() {
        let c = classify("What spare parts are available for breaker B-456?");
        assert_eq!(c.intent, Intent::Inventory);
        assert_eq!(c.entity, asset("B-456"));

        // "department" does not mean parts
        assert_eq!(classify("which department are you in").intent, Intent::OffTopic);
    }

    #[test]
    fn test_off_topic_and_general_search() {
        assert_eq!(classify("What's the weather like?").intent, Intent::OffTopic);

        let c = classify("Tell me about transformer T-123");
        assert_eq!(c.intent, Intent::GeneralSearch);
        assert_eq!(c.keywords.as_deref(), Some("transformer"));

        let bare = classify("anything on T-987?");
        assert_eq!(bare.intent, Intent::GeneralSearch);
        assert_eq!(bare.keywords.as_deref(), Some("T-987"));
    }

    #[test]
    fn test_intent_labels_round_trip_serde() {
        for intent in Intent::ALL {
            let v = serde_json::to_value(intent).unwrap();
            assert_eq!(v, intent.as_str());
        }
    }
}
