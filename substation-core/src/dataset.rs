//! In-memory operations dataset and its query helpers.
//!
//! `Dataset::builtin()` is the sample data the assistant ships with; loaders in
//! `substation-ingest` can replace it with a seed file.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::records::{
    AssetDiagnostic, IncidentReport, InspectionReport, InspectionType, InventoryItem,
    MaintenanceRecord, PredictiveRecommendation, RiskLevel, SafetyGuideline, SensorReading,
    TrainingMaterial, WorkOrder, WorkOrderStatus,
};

/// All operations tables, keyed by their database table names when serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    #[serde(rename = "AssetDiagnostics", default)]
    pub asset_diagnostics: Vec<AssetDiagnostic>,
    #[serde(rename = "MaintenanceWorkOrders", default)]
    pub work_orders: Vec<WorkOrder>,
    #[serde(rename = "MaintenanceHistory", default)]
    pub maintenance_history: Vec<MaintenanceRecord>,
    #[serde(rename = "InspectionReports", default)]
    pub inspection_reports: Vec<InspectionReport>,
    #[serde(rename = "PredictiveMaintenance", default)]
    pub predictive_maintenance: Vec<PredictiveRecommendation>,
    #[serde(rename = "RealTimeData", default)]
    pub real_time_data: Vec<SensorReading>,
    #[serde(rename = "SafetyGuidelines", default)]
    pub safety_guidelines: Vec<SafetyGuideline>,
    #[serde(rename = "TrainingMaterials", default)]
    pub training_materials: Vec<TrainingMaterial>,
    #[serde(rename = "IncidentReports", default)]
    pub incident_reports: Vec<IncidentReport>,
    #[serde(rename = "Inventory", default)]
    pub inventory: Vec<InventoryItem>,
}

/// Hits per table for a keyword search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub asset_diagnostics: Vec<AssetDiagnostic>,
    pub maintenance_orders: Vec<WorkOrder>,
    pub inspection_reports: Vec<InspectionReport>,
    pub predictive_maintenance: Vec<PredictiveRecommendation>,
    pub inventory: Vec<InventoryItem>,
}

impl SearchResults {
    pub fn total(&self) -> usize {
        self.asset_diagnostics.len()
            + self.maintenance_orders.len()
            + self.inspection_reports.len()
            + self.predictive_maintenance.len()
            + self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Fold another result set in, skipping rows already present.
    pub fn merge(&mut self, other: SearchResults) {
        fn extend_unique<T: PartialEq>(into: &mut Vec<T>, from: Vec<T>) {
            for row in from {
                if !into.contains(&row) {
                    into.push(row);
                }
            }
        }
        extend_unique(&mut self.asset_diagnostics, other.asset_diagnostics);
        extend_unique(&mut self.maintenance_orders, other.maintenance_orders);
        extend_unique(&mut self.inspection_reports, other.inspection_reports);
        extend_unique(&mut self.predictive_maintenance, other.predictive_maintenance);
        extend_unique(&mut self.inventory, other.inventory);
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

impl Dataset {
    /// Table name -> row count, in declaration order.
    pub fn table_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("AssetDiagnostics", self.asset_diagnostics.len()),
            ("MaintenanceWorkOrders", self.work_orders.len()),
            ("MaintenanceHistory", self.maintenance_history.len()),
            ("InspectionReports", self.inspection_reports.len()),
            ("PredictiveMaintenance", self.predictive_maintenance.len()),
            ("RealTimeData", self.real_time_data.len()),
            ("SafetyGuidelines", self.safety_guidelines.len()),
            ("TrainingMaterials", self.training_materials.len()),
            ("IncidentReports", self.incident_reports.len()),
            ("Inventory", self.inventory.len()),
        ]
    }

    pub fn asset_health(&self, asset_id: &str) -> Option<&AssetDiagnostic> {
        self.asset_diagnostics.iter().find(|d| d.asset_id == asset_id)
    }

    pub fn work_orders_for(&self, asset_id: &str) -> Vec<&WorkOrder> {
        self.work_orders.iter().filter(|w| w.asset_id == asset_id).collect()
    }

    /// Scheduled work orders whose asset name mentions `location`.
    pub fn scheduled_maintenance(&self, location: &str) -> Vec<&WorkOrder> {
        let needle = location.trim().to_lowercase();
        self.work_orders
            .iter()
            .filter(|w| w.work_order_status == WorkOrderStatus::Scheduled)
            .filter(|w| contains_ci(&w.asset_name, &needle) || contains_ci(&w.asset_id, &needle))
            .collect()
    }

    /// Completed maintenance for an asset, newest first.
    pub fn maintenance_history(&self, asset_id: &str, limit: usize) -> Vec<&MaintenanceRecord> {
        let mut rows: Vec<&MaintenanceRecord> = self
            .maintenance_history
            .iter()
            .filter(|m| m.asset_id == asset_id)
            .collect();
        rows.sort_by(|a, b| b.maintenance_date.cmp(&a.maintenance_date));
        rows.truncate(limit);
        rows
    }

    /// Inspection reports for an asset, newest first, optionally of one type.
    pub fn inspection_reports(
        &self,
        asset_id: &str,
        inspection_type: Option<InspectionType>,
    ) -> Vec<&InspectionReport> {
        let mut rows: Vec<&InspectionReport> = self
            .inspection_reports
            .iter()
            .filter(|r| r.asset_id == asset_id)
            .filter(|r| inspection_type.is_none_or(|t| r.inspection_type == t))
            .collect();
        rows.sort_by(|a, b| b.report_date.cmp(&a.report_date));
        rows
    }

    pub fn predictions_for(&self, asset_id: &str) -> Vec<&PredictiveRecommendation> {
        self.predictive_maintenance
            .iter()
            .filter(|p| p.asset_id == asset_id)
            .collect()
    }

    /// Latest readings for a substation, newest first.
    pub fn real_time_data(&self, substation_id: &str) -> Vec<&SensorReading> {
        let mut rows: Vec<&SensorReading> = self
            .real_time_data
            .iter()
            .filter(|r| r.substation_id == substation_id)
            .collect();
        // Stable sort keeps table order for readings taken at the same instant.
        rows.sort_by(|a, b| b.measurement_time.cmp(&a.measurement_time));
        rows
    }

    pub fn safety_guideline(&self, procedure: &str) -> Option<&SafetyGuideline> {
        let needle = procedure.trim().to_lowercase();
        self.safety_guidelines
            .iter()
            .find(|g| contains_ci(&g.procedure_name, &needle))
    }

    pub fn training_for(&self, topic: &str) -> Vec<&TrainingMaterial> {
        let needle = topic.trim().to_lowercase();
        self.training_materials
            .iter()
            .filter(|t| contains_ci(&t.topic, &needle))
            .collect()
    }

    pub fn incidents_for(&self, asset_id: &str) -> Vec<&IncidentReport> {
        self.incident_reports
            .iter()
            .filter(|i| i.asset_id == asset_id)
            .collect()
    }

    pub fn spare_parts_for(&self, asset_id: &str) -> Vec<&InventoryItem> {
        self.inventory.iter().filter(|i| i.asset_id == asset_id).collect()
    }

    /// Case-insensitive substring search across the searchable tables.
    pub fn search(&self, keyword: &str) -> SearchResults {
        let k = keyword.trim().to_lowercase();
        if k.is_empty() {
            return SearchResults::default();
        }

        SearchResults {
            asset_diagnostics: self
                .asset_diagnostics
                .iter()
                .filter(|d| {
                    contains_ci(&d.asset_id, &k)
                        || contains_ci(&d.asset_name, &k)
                        || contains_ci(&d.diagnostic_summary, &k)
                })
                .cloned()
                .collect(),
            maintenance_orders: self
                .work_orders
                .iter()
                .filter(|w| {
                    contains_ci(&w.asset_id, &k)
                        || contains_ci(&w.asset_name, &k)
                        || contains_ci(&w.maintenance_details, &k)
                })
                .cloned()
                .collect(),
            inspection_reports: self
                .inspection_reports
                .iter()
                .filter(|r| {
                    contains_ci(&r.asset_id, &k)
                        || contains_ci(&r.asset_name, &k)
                        || contains_ci(&r.report_summary, &k)
                })
                .cloned()
                .collect(),
            predictive_maintenance: self
                .predictive_maintenance
                .iter()
                .filter(|p| {
                    contains_ci(&p.asset_id, &k)
                        || contains_ci(&p.asset_name, &k)
                        || contains_ci(&p.recommendation_details, &k)
                })
                .cloned()
                .collect(),
            inventory: self
                .inventory
                .iter()
                .filter(|i| {
                    contains_ci(&i.asset_id, &k)
                        || contains_ci(&i.asset_name, &k)
                        || contains_ci(&i.part_name, &k)
                })
                .cloned()
                .collect(),
        }
    }

    /// The sample operations data.
    pub fn builtin() -> Self {
        Self {
            asset_diagnostics: vec![
                AssetDiagnostic {
                    diagnostic_id: 1,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    health_score: Some(92.5),
                    last_diagnostic_date: datetime(2025, 4, 5, 8, 30, 0),
                    diagnostic_summary: "No issues detected. Operating within normal parameters."
                        .into(),
                    data_source: "Bentley APM".into(),
                },
                AssetDiagnostic {
                    diagnostic_id: 2,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    health_score: Some(85.0),
                    last_diagnostic_date: datetime(2025, 4, 4, 14, 20, 0),
                    diagnostic_summary: "Minor degradation detected in switch contacts.".into(),
                    data_source: "PI".into(),
                },
                AssetDiagnostic {
                    diagnostic_id: 3,
                    asset_id: "T-789".into(),
                    asset_name: "Transformer T-789".into(),
                    health_score: Some(78.3),
                    last_diagnostic_date: datetime(2025, 4, 3, 10, 15, 0),
                    diagnostic_summary: "Temperature trends indicate potential overheating."
                        .into(),
                    data_source: "TOA".into(),
                },
            ],
            work_orders: vec![
                WorkOrder {
                    work_order_id: 1001,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    scheduled_date: date(2025, 4, 10),
                    maintenance_details: "Routine transformer maintenance including oil testing."
                        .into(),
                    work_order_status: WorkOrderStatus::Scheduled,
                },
                WorkOrder {
                    work_order_id: 1002,
                    asset_id: "S-567".into(),
                    asset_name: "Substation S-567".into(),
                    scheduled_date: date(2025, 4, 11),
                    maintenance_details: "Inspection and cleaning of electrical panels.".into(),
                    work_order_status: WorkOrderStatus::Scheduled,
                },
                WorkOrder {
                    work_order_id: 1003,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    scheduled_date: date(2025, 4, 9),
                    maintenance_details: "Replace worn contacts and perform operational tests."
                        .into(),
                    work_order_status: WorkOrderStatus::InProgress,
                },
            ],
            maintenance_history: vec![
                MaintenanceRecord {
                    history_id: 2001,
                    work_order_id: 1001,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    maintenance_date: date(2025, 3, 15),
                    maintenance_log:
                        "Performed oil analysis and replaced filters. No issues found.".into(),
                },
                MaintenanceRecord {
                    history_id: 2002,
                    work_order_id: 1003,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    maintenance_date: date(2025, 3, 20),
                    maintenance_log:
                        "Cleaned contacts and tested operation. Recommended follow-up inspection."
                            .into(),
                },
                MaintenanceRecord {
                    history_id: 2003,
                    work_order_id: 1001,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    maintenance_date: date(2025, 2, 10),
                    maintenance_log: "Routine maintenance completed; performance within norms."
                        .into(),
                },
            ],
            inspection_reports: vec![
                InspectionReport {
                    inspection_id: 3001,
                    asset_id: "T-789".into(),
                    asset_name: "Transformer T-789".into(),
                    inspection_type: InspectionType::Infrared,
                    report_date: date(2025, 4, 1),
                    report_summary:
                        "Infrared imaging indicates potential hot spots around core components."
                            .into(),
                    inspector_name: "John Doe".into(),
                },
                InspectionReport {
                    inspection_id: 3002,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    inspection_type: InspectionType::Visual,
                    report_date: date(2025, 3, 28),
                    report_summary: "Visual inspection revealed minor wear and tear on casing."
                        .into(),
                    inspector_name: "Jane Smith".into(),
                },
                InspectionReport {
                    inspection_id: 3003,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    inspection_type: InspectionType::Infrared,
                    report_date: date(2025, 3, 30),
                    report_summary: "Thermal patterns are normal, no anomalies detected.".into(),
                    inspector_name: "Alice Johnson".into(),
                },
            ],
            predictive_maintenance: vec![
                PredictiveRecommendation {
                    recommendation_id: 4001,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    prediction_date: date(2025, 4, 6),
                    risk_level: RiskLevel::Medium,
                    recommendation_details:
                        "Consider scheduling a detailed oil analysis soon due to slight thermal drift."
                            .into(),
                    sensor_data_summary: "Oil temperature trending upwards.".into(),
                },
                PredictiveRecommendation {
                    recommendation_id: 4002,
                    asset_id: "T-789".into(),
                    asset_name: "Transformer T-789".into(),
                    prediction_date: date(2025, 4, 6),
                    risk_level: RiskLevel::High,
                    recommendation_details:
                        "Immediate inspection recommended due to high thermal readings and abnormal vibration levels."
                            .into(),
                    sensor_data_summary: "Thermal and vibration sensors indicate risk.".into(),
                },
                PredictiveRecommendation {
                    recommendation_id: 4003,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    prediction_date: date(2025, 4, 6),
                    risk_level: RiskLevel::Low,
                    recommendation_details:
                        "No immediate action needed, monitor the switch contacts for further degradation."
                            .into(),
                    sensor_data_summary: "Normal operation with slight contact wear.".into(),
                },
            ],
            real_time_data: vec![
                SensorReading {
                    data_id: 5001,
                    substation_id: "S-567".into(),
                    sensor_type: "Load".into(),
                    value: 75.5,
                    measurement_time: datetime(2025, 4, 5, 9, 0, 0),
                },
                SensorReading {
                    data_id: 5002,
                    substation_id: "S-567".into(),
                    sensor_type: "Voltage".into(),
                    value: 11.5,
                    measurement_time: datetime(2025, 4, 5, 9, 0, 0),
                },
                SensorReading {
                    data_id: 5003,
                    substation_id: "S-567".into(),
                    sensor_type: "Temperature".into(),
                    value: 65.0,
                    measurement_time: datetime(2025, 4, 5, 9, 0, 0),
                },
            ],
            safety_guidelines: vec![
                SafetyGuideline {
                    guideline_id: 7001,
                    procedure_name: "Live-Line Maintenance".into(),
                    required_ppe: "Insulated gloves, arc flash suit, helmet".into(),
                    safety_instructions:
                        "Always de-energize equipment before performing maintenance.".into(),
                    compliance_notes: "Follow NFPA 70E guidelines.".into(),
                },
                SafetyGuideline {
                    guideline_id: 7002,
                    procedure_name: "Breaker Racking".into(),
                    required_ppe: "Hard hat, safety glasses, gloves".into(),
                    safety_instructions:
                        "Ensure lockout-tagout procedures are followed before racking.".into(),
                    compliance_notes: "Review annual safety training.".into(),
                },
                SafetyGuideline {
                    guideline_id: 7003,
                    procedure_name: "High Voltage Inspections".into(),
                    required_ppe: "Insulated gloves, dielectric boots, face shield".into(),
                    safety_instructions: "Maintain a safe distance and use appropriate barriers."
                        .into(),
                    compliance_notes: "Compliance with OSHA regulations required.".into(),
                },
            ],
            training_materials: vec![
                TrainingMaterial {
                    training_id: 8001,
                    topic: "DGA Test Interpretation".into(),
                    content:
                        "Detailed guide on interpreting dissolved gas analysis for transformers."
                            .into(),
                    certification_required: true,
                    reference_manual: "Transformer Maintenance Manual, Chapter 5".into(),
                    url: "http://example.com/dga-guide".into(),
                },
                TrainingMaterial {
                    training_id: 8002,
                    topic: "Infrared Inspection Techniques".into(),
                    content:
                        "Best practices for conducting infrared inspections on electrical equipment."
                            .into(),
                    certification_required: false,
                    reference_manual: "Infrared Inspection Handbook".into(),
                    url: "http://example.com/ir-handbook".into(),
                },
                TrainingMaterial {
                    training_id: 8003,
                    topic: "Safety Protocols for Live-Line Maintenance".into(),
                    content: "Step-by-step procedures for safely performing live-line maintenance."
                        .into(),
                    certification_required: true,
                    reference_manual: "Live-Line Safety Manual".into(),
                    url: "http://example.com/live-line-safety".into(),
                },
            ],
            incident_reports: vec![
                IncidentReport {
                    incident_id: 9001,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    incident_date: date(2025, 4, 4),
                    failure_type: "Overheating".into(),
                    description:
                        "Transformer experienced abnormal temperature rise leading to a shutdown."
                            .into(),
                    logged_by: "John Doe".into(),
                    category: "Thermal".into(),
                    potential_causes: "Oil degradation, blocked cooling fins".into(),
                },
                IncidentReport {
                    incident_id: 9002,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    incident_date: date(2025, 4, 3),
                    failure_type: "Mechanical Failure".into(),
                    description: "Breaker failed to operate correctly during routine testing."
                        .into(),
                    logged_by: "Jane Smith".into(),
                    category: "Mechanical".into(),
                    potential_causes: "Wear and tear on contacts".into(),
                },
                IncidentReport {
                    incident_id: 9003,
                    asset_id: "T-789".into(),
                    asset_name: "Transformer T-789".into(),
                    incident_date: date(2025, 4, 2),
                    failure_type: "Insulation Failure".into(),
                    description:
                        "Transformer insulation degraded over time causing intermittent faults."
                            .into(),
                    logged_by: "Alice Johnson".into(),
                    category: "Electrical".into(),
                    potential_causes: "Aging, environmental stress".into(),
                },
            ],
            inventory: vec![
                InventoryItem {
                    part_id: 10001,
                    asset_id: "T-987".into(),
                    asset_name: "Transformer T-987".into(),
                    part_name: "Bushings".into(),
                    available_quantity: 5,
                    order_status: "In Stock".into(),
                    location: "Warehouse A".into(),
                },
                InventoryItem {
                    part_id: 10002,
                    asset_id: "B-456".into(),
                    asset_name: "Breaker B-456".into(),
                    part_name: "Replacement Contacts".into(),
                    available_quantity: 2,
                    order_status: "Ordered".into(),
                    location: "Warehouse B".into(),
                },
                InventoryItem {
                    part_id: 10003,
                    asset_id: "T-123".into(),
                    asset_name: "Transformer T-123".into(),
                    part_name: "Oil Filters".into(),
                    available_quantity: 10,
                    order_status: "In Stock".into(),
                    location: "Warehouse A".into(),
                },
            ],
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, s).unwrap_or_default()
}
