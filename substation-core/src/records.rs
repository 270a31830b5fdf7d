//! Row types for the substation operations tables.
//!
//! Field names follow the column names of the operations database so rows
//! serialize exactly as the REST layer has always returned them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Latest diagnostic result for an asset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetDiagnostic {
    pub diagnostic_id: u32,
    /// Asset identifier (T-123, B-456, ...)
    pub asset_id: String,
    pub asset_name: String,
    /// Health score (0.0 - 100.0); None when the column was NULL
    pub health_score: Option<f64>,
    #[serde(with = "sql_datetime")]
    pub last_diagnostic_date: NaiveDateTime,
    #[serde(default)]
    pub diagnostic_summary: String,
    /// Source system (Bentley APM, PI, TOA, ...)
    #[serde(default)]
    pub data_source: String,
}

/// Maintenance work order lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkOrderStatus {
    Scheduled,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WorkOrderStatus::Scheduled => "Scheduled",
            WorkOrderStatus::InProgress => "In Progress",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkOrder {
    pub work_order_id: u32,
    pub asset_id: String,
    pub asset_name: String,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub maintenance_details: String,
    pub work_order_status: WorkOrderStatus,
}

/// Completed maintenance entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceRecord {
    pub history_id: u32,
    #[serde(default)]
    pub work_order_id: u32,
    pub asset_id: String,
    pub asset_name: String,
    pub maintenance_date: NaiveDate,
    #[serde(default)]
    pub maintenance_log: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InspectionType {
    Visual,
    Infrared,
    Ultrasonic,
    #[serde(rename = "Oil Analysis")]
    OilAnalysis,
    #[default]
    Other,
}

impl InspectionType {
    pub fn label(&self) -> &'static str {
        match self {
            InspectionType::Visual => "Visual",
            InspectionType::Infrared => "Infrared",
            InspectionType::Ultrasonic => "Ultrasonic",
            InspectionType::OilAnalysis => "Oil Analysis",
            InspectionType::Other => "Other",
        }
    }

    /// Parse a user-supplied type name (query strings, CLI flags).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Some(InspectionType::Visual),
            "infrared" => Some(InspectionType::Infrared),
            "ultrasonic" => Some(InspectionType::Ultrasonic),
            "oil analysis" | "oil" => Some(InspectionType::OilAnalysis),
            "other" => Some(InspectionType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InspectionReport {
    pub inspection_id: u32,
    pub asset_id: String,
    pub asset_name: String,
    #[serde(default)]
    pub inspection_type: InspectionType,
    pub report_date: NaiveDate,
    #[serde(default)]
    pub report_summary: String,
    #[serde(default)]
    pub inspector_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

/// Predictive maintenance recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictiveRecommendation {
    pub recommendation_id: u32,
    pub asset_id: String,
    pub asset_name: String,
    pub prediction_date: NaiveDate,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub recommendation_details: String,
    #[serde(default)]
    pub sensor_data_summary: String,
}

/// Known sensor channels; anything else is reported without a unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Load,
    Voltage,
    Temperature,
}

impl SensorKind {
    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Load => "Load",
            SensorKind::Voltage => "Voltage",
            SensorKind::Temperature => "Temperature",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Load => "%",
            SensorKind::Voltage => "kV",
            SensorKind::Temperature => "°F",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "load" => Some(SensorKind::Load),
            "voltage" => Some(SensorKind::Voltage),
            "temperature" => Some(SensorKind::Temperature),
            _ => None,
        }
    }
}

/// Real-time measurement from a substation sensor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorReading {
    pub data_id: u32,
    pub substation_id: String,
    #[serde(default)]
    pub sensor_type: String,
    pub value: f64,
    #[serde(with = "sql_datetime")]
    pub measurement_time: NaiveDateTime,
}

impl SensorReading {
    pub fn kind(&self) -> Option<SensorKind> {
        SensorKind::from_label(&self.sensor_type)
    }

    /// Unit suffix for display, empty for unknown sensor types
    pub fn unit(&self) -> &'static str {
        self.kind().map(|k| k.unit()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyGuideline {
    pub guideline_id: u32,
    pub procedure_name: String,
    #[serde(rename = "required_PPE", default)]
    pub required_ppe: String,
    #[serde(default)]
    pub safety_instructions: String,
    #[serde(default)]
    pub compliance_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMaterial {
    pub training_id: u32,
    pub topic: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub certification_required: bool,
    #[serde(default)]
    pub reference_manual: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentReport {
    pub incident_id: u32,
    pub asset_id: String,
    pub asset_name: String,
    pub incident_date: NaiveDate,
    #[serde(default)]
    pub failure_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logged_by: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub potential_causes: String,
}

/// Spare part stock line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub part_id: u32,
    pub asset_id: String,
    pub asset_name: String,
    #[serde(default)]
    pub part_name: String,
    #[serde(default)]
    pub available_quantity: u32,
    /// "In Stock", "Ordered", ...
    #[serde(default)]
    pub order_status: String,
    #[serde(default)]
    pub location: String,
}

/// Human-readable asset class from an ID prefix (T-123 -> Transformer).
pub fn asset_class(id: &str) -> &'static str {
    match id.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('T') => "Transformer",
        Some('B') => "Breaker",
        Some('S') => "Substation",
        _ => "Asset",
    }
}

/// Display name for an asset ID ("Transformer T-123").
pub fn asset_display_name(id: &str) -> String {
    format!("{} {}", asset_class(id), id)
}

/// `YYYY-MM-DD HH:MM:SS` timestamps, the format the operations database uses.
pub mod sql_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(s.trim(), FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_class_from_prefix() {
        assert_eq!(asset_class("T-123"), "Transformer");
        assert_eq!(asset_class("b-456"), "Breaker");
        assert_eq!(asset_class("S-567"), "Substation");
        assert_eq!(asset_class("X-1"), "Asset");
        assert_eq!(asset_display_name("T-555"), "Transformer T-555");
    }

    #[test]
    fn test_diagnostic_serializes_sql_columns() {
        let diag = AssetDiagnostic {
            diagnostic_id: 1,
            asset_id: "T-123".to_string(),
            asset_name: "Transformer T-123".to_string(),
            health_score: Some(92.5),
            last_diagnostic_date: NaiveDateTime::parse_from_str(
                "2025-04-05 08:30:00",
                sql_datetime::FORMAT,
            )
            .unwrap(),
            diagnostic_summary: "No issues detected.".to_string(),
            data_source: "Bentley APM".to_string(),
        };
        let v = serde_json::to_value(&diag).unwrap();
        assert_eq!(v["last_diagnostic_date"], "2025-04-05 08:30:00");
        assert_eq!(v["health_score"], 92.5);

        let back: AssetDiagnostic = serde_json::from_value(v).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_enum_labels_match_serde_names() {
        assert_eq!(
            serde_json::to_value(WorkOrderStatus::InProgress).unwrap(),
            WorkOrderStatus::InProgress.label()
        );
        assert_eq!(
            serde_json::to_value(InspectionType::OilAnalysis).unwrap(),
            InspectionType::OilAnalysis.label()
        );
        assert_eq!(InspectionType::parse("oil"), Some(InspectionType::OilAnalysis));
        assert_eq!(InspectionType::parse("thermal"), None);
    }

    #[test]
    fn test_safety_guideline_ppe_column_name() {
        let g = SafetyGuideline {
            guideline_id: 7001,
            procedure_name: "Breaker Racking".to_string(),
            required_ppe: "Hard hat".to_string(),
            safety_instructions: "Lockout first.".to_string(),
            compliance_notes: "Annual training.".to_string(),
        };
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["required_PPE"], "Hard hat");
    }

    #[test]
    fn test_sensor_units() {
        let mut r = SensorReading {
            data_id: 1,
            substation_id: "S-567".to_string(),
            sensor_type: "Voltage".to_string(),
            value: 11.5,
            measurement_time: NaiveDateTime::parse_from_str(
                "2025-04-05 09:00:00",
                sql_datetime::FORMAT,
            )
            .unwrap(),
        };
        assert_eq!(r.unit(), "kV");
        r.sensor_type = "Humidity".to_string();
        assert_eq!(r.unit(), "");
    }
}
