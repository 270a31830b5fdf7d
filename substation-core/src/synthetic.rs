//! Synthetic fallback records.
//!
//! When a user asks about an ID the dataset has no rows for, the assistant
//! fabricates one plausible record instead of answering "not found". Values
//! are randomized within realistic ranges; seed the generator for
//! reproducible output.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::records::{
    asset_display_name, AssetDiagnostic, IncidentReport, InspectionReport, InspectionType,
    InventoryItem, MaintenanceRecord, PredictiveRecommendation, RiskLevel, SensorKind,
    SensorReading, WorkOrder, WorkOrderStatus,
};

/// Synthetic rows are numbered from here so they never collide with seed IDs.
const SYNTHETIC_ID_BASE: u32 = 90_000;

const DIAGNOSTIC_SUMMARIES: &[&str] = &[
    "No issues detected. Operating within normal parameters.",
    "Minor degradation detected; continue routine monitoring.",
    "Slight temperature rise observed under peak load.",
    "Dissolved gas levels within acceptable limits.",
];
const DATA_SOURCES: &[&str] = &["Bentley APM", "PI", "TOA"];
const MAINTENANCE_TASKS: &[&str] = &[
    "Routine inspection and cleaning of components.",
    "Oil sampling and filter replacement.",
    "Contact resistance testing and lubrication.",
    "Thermal scan and tightening of connections.",
];
const INSPECTORS: &[&str] = &["John Doe", "Jane Smith", "Alice Johnson", "Raj Patel"];
const INSPECTION_FINDINGS: &[&str] = &[
    "No anomalies detected during inspection.",
    "Minor wear observed; schedule follow-up within 6 months.",
    "Slight discoloration noted near terminals; monitor.",
];
const RECOMMENDATIONS: &[(&str, &str)] = &[
    (
        "No immediate action needed, continue routine monitoring.",
        "Sensor readings stable.",
    ),
    (
        "Schedule a detailed inspection within the next maintenance window.",
        "Gradual upward trend in operating temperature.",
    ),
    (
        "Prioritize inspection due to abnormal vibration levels.",
        "Vibration sensors above baseline.",
    ),
];
const FAILURES: &[(&str, &str, &str)] = &[
    ("Overheating", "Thermal", "Blocked cooling, oil degradation"),
    ("Mechanical Failure", "Mechanical", "Wear and tear on moving parts"),
    ("Insulation Failure", "Electrical", "Aging, moisture ingress"),
];
const PARTS: &[&str] = &["Bushings", "Oil Filters", "Replacement Contacts", "Gaskets"];
const WAREHOUSES: &[&str] = &["Warehouse A", "Warehouse B", "Central Store"];

fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (value * f).round() / f
}

/// Randomized record factory
#[derive(Debug)]
pub struct SyntheticGenerator {
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Deterministic generator, for tests and reproducible demos
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    fn next_id(&mut self) -> u32 {
        SYNTHETIC_ID_BASE + self.rng.gen_range(0..10_000)
    }

    fn days_before(&mut self, today: NaiveDate, max: i64) -> NaiveDate {
        today - Duration::days(self.rng.gen_range(1..=max))
    }

    pub fn asset_diagnostic(&mut self, asset_id: &str, today: NaiveDate) -> AssetDiagnostic {
        let day = self.days_before(today, 30);
        let hour = self.rng.gen_range(7..18);
        let minute = self.rng.gen_range(0..4) * 15;
        AssetDiagnostic {
            diagnostic_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            health_score: Some(round_to(self.rng.gen_range(60.0..99.0), 1)),
            last_diagnostic_date: day.and_hms_opt(hour, minute, 0).unwrap_or_default(),
            diagnostic_summary: pick(&mut self.rng, DIAGNOSTIC_SUMMARIES).to_string(),
            data_source: pick(&mut self.rng, DATA_SOURCES).to_string(),
        }
    }

    /// An upcoming scheduled work order
    pub fn work_order(&mut self, asset_id: &str, today: NaiveDate) -> WorkOrder {
        let ahead = self.rng.gen_range(1..=14);
        WorkOrder {
            work_order_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            scheduled_date: today + Duration::days(ahead),
            maintenance_details: pick(&mut self.rng, MAINTENANCE_TASKS).to_string(),
            work_order_status: WorkOrderStatus::Scheduled,
        }
    }

    pub fn maintenance_record(&mut self, asset_id: &str, today: NaiveDate) -> MaintenanceRecord {
        let task = pick(&mut self.rng, MAINTENANCE_TASKS);
        MaintenanceRecord {
            history_id: self.next_id(),
            work_order_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            maintenance_date: self.days_before(today, 30),
            maintenance_log: format!("{} Completed without issues.", task),
        }
    }

    pub fn inspection_report(
        &mut self,
        asset_id: &str,
        inspection_type: Option<InspectionType>,
        today: NaiveDate,
    ) -> InspectionReport {
        let kind = inspection_type.unwrap_or_else(|| {
            *[InspectionType::Visual, InspectionType::Infrared, InspectionType::Ultrasonic]
                .choose(&mut self.rng)
                .unwrap_or(&InspectionType::Visual)
        });
        InspectionReport {
            inspection_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            inspection_type: kind,
            report_date: self.days_before(today, 30),
            report_summary: pick(&mut self.rng, INSPECTION_FINDINGS).to_string(),
            inspector_name: pick(&mut self.rng, INSPECTORS).to_string(),
        }
    }

    pub fn prediction(&mut self, asset_id: &str, today: NaiveDate) -> PredictiveRecommendation {
        let idx = self.rng.gen_range(0..RECOMMENDATIONS.len());
        let (details, summary) = RECOMMENDATIONS[idx];
        let risk = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High][idx];
        PredictiveRecommendation {
            recommendation_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            prediction_date: today,
            risk_level: risk,
            recommendation_details: details.to_string(),
            sensor_data_summary: summary.to_string(),
        }
    }

    /// One reading per known sensor channel, all stamped `now`.
    pub fn sensor_readings(&mut self, substation_id: &str, now: NaiveDateTime) -> Vec<SensorReading> {
        [SensorKind::Load, SensorKind::Voltage, SensorKind::Temperature]
            .into_iter()
            .map(|kind| {
                let value = match kind {
                    SensorKind::Load => round_to(self.rng.gen_range(40.0..95.0), 1),
                    SensorKind::Voltage => round_to(self.rng.gen_range(10.0..13.0), 2),
                    SensorKind::Temperature => round_to(self.rng.gen_range(55.0..85.0), 1),
                };
                SensorReading {
                    data_id: self.next_id(),
                    substation_id: substation_id.to_string(),
                    sensor_type: kind.label().to_string(),
                    value,
                    measurement_time: now,
                }
            })
            .collect()
    }

    pub fn incident(&mut self, asset_id: &str, today: NaiveDate) -> IncidentReport {
        let (failure, category, causes) = FAILURES[self.rng.gen_range(0..FAILURES.len())];
        IncidentReport {
            incident_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            incident_date: self.days_before(today, 30),
            failure_type: failure.to_string(),
            description: format!("{} reported during routine operation.", failure),
            logged_by: pick(&mut self.rng, INSPECTORS).to_string(),
            category: category.to_string(),
            potential_causes: causes.to_string(),
        }
    }

    pub fn inventory_item(&mut self, asset_id: &str) -> InventoryItem {
        let quantity = self.rng.gen_range(0..=12);
        InventoryItem {
            part_id: self.next_id(),
            asset_id: asset_id.to_string(),
            asset_name: asset_display_name(asset_id),
            part_name: pick(&mut self.rng, PARTS).to_string(),
            available_quantity: quantity,
            order_status: if quantity > 0 { "In Stock" } else { "Ordered" }.to_string(),
            location: pick(&mut self.rng, WAREHOUSES).to_string(),
        }
    }
}
