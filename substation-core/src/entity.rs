//! Entity extraction: asset/substation IDs, safety procedures, training topics.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static ASSET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([tb]-\d+)\b").expect("asset id pattern"));
static SUBSTATION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(s-\d+)\b").expect("substation id pattern"));

/// Something the user asked about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Entity {
    /// Equipment ID, uppercased (T-123, B-456)
    Asset(String),
    /// Substation ID, uppercased (S-567)
    Substation(String),
    /// Safety procedure name as stored in SafetyGuidelines
    Procedure(String),
    /// Training topic fragment
    Topic(String),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::Asset(s) | Entity::Substation(s) | Entity::Procedure(s) | Entity::Topic(s) => s,
        }
    }

    /// Asset or substation ID, if this entity names one
    pub fn equipment_id(&self) -> Option<&str> {
        match self {
            Entity::Asset(s) | Entity::Substation(s) => Some(s),
            _ => None,
        }
    }

    pub fn substation_id(&self) -> Option<&str> {
        match self {
            Entity::Substation(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Pull an asset or substation ID out of a lowercased message.
///
/// A substation ID wins when both appear.
pub fn extract_id(normalized: &str) -> Option<Entity> {
    if let Some(c) = SUBSTATION_ID.captures(normalized) {
        return Some(Entity::Substation(c[1].to_uppercase()));
    }
    ASSET_ID
        .captures(normalized)
        .map(|c| Entity::Asset(c[1].to_uppercase()))
}

/// Map safety-related wording to a SafetyGuidelines procedure name.
pub fn extract_procedure(normalized: &str) -> Option<Entity> {
    let name = if normalized.contains("live-line") || normalized.contains("live line") {
        "Live-Line Maintenance"
    } else if normalized.contains("breaker") {
        "Breaker Racking"
    } else if normalized.contains("high voltage") || normalized.contains("high-voltage") {
        "High Voltage Inspections"
    } else {
        return None;
    };
    Some(Entity::Procedure(name.to_string()))
}

/// Map training wording to a topic fragment.
pub fn extract_topic(normalized: &str) -> Option<Entity> {
    let topic = if normalized.contains("dga") || normalized.contains("dissolved gas") {
        "DGA"
    } else if normalized.contains("infrared") {
        "Infrared"
    } else if normalized.contains("live-line") || normalized.contains("live line") {
        "Live-Line"
    } else {
        return None;
    };
    Some(Entity::Topic(topic.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_asset_id_uppercases() {
        assert_eq!(
            extract_id("what is the health of transformer t-123?"),
            Some(Entity::Asset("T-123".to_string()))
        );
        assert_eq!(
            extract_id("breaker b-456 spare parts"),
            Some(Entity::Asset("B-456".to_string()))
        );
    }

    #[test]
    fn test_substation_takes_precedence() {
        assert_eq!(
            extract_id("is t-123 at substation s-567 ok"),
            Some(Entity::Substation("S-567".to_string()))
        );
    }

    #[test]
    fn test_no_id_inside_words() {
        assert_eq!(extract_id("post-123 nothing here"), None);
        assert_eq!(extract_id("no ids at all"), None);
    }

    #[test]
    fn test_procedure_mapping() {
        assert_eq!(
            extract_procedure("safety for live line work").unwrap().id(),
            "Live-Line Maintenance"
        );
        assert_eq!(
            extract_procedure("ppe for breaker racking").unwrap().id(),
            "Breaker Racking"
        );
        assert_eq!(extract_procedure("general safety"), None);
    }

    #[test]
    fn test_entity_serializes_tagged() {
        let v = serde_json::to_value(Entity::Substation("S-567".to_string())).unwrap();
        assert_eq!(v["kind"], "substation");
        assert_eq!(v["value"], "S-567");
        assert_eq!(Entity::Asset("T-1".to_string()).to_string(), "T-1");
    }
}
