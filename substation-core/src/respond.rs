//! Natural-language answers built from looked-up rows.

use chrono::{Datelike, NaiveDate};

use crate::dataset::SearchResults;
use crate::intent::Intent;
use crate::records::{
    AssetDiagnostic, IncidentReport, InspectionReport, InventoryItem, MaintenanceRecord,
    PredictiveRecommendation, SafetyGuideline, SensorReading, TrainingMaterial, WorkOrder,
};

pub const GREETING_MESSAGE: &str = "Hello! I'm the PG&E Substation Operations Assistant. I can provide information about substation assets, maintenance schedules, safety guidelines, and more. How can I help you today?";

pub const HELP_MESSAGE: &str = "I'm the PG&E Substation Operations Assistant, designed to provide information from our substation database. I can help you with:\n\n\
- Asset health status (e.g., 'What is the health status of transformer T-123?')\n\
- Maintenance schedules (e.g., 'Is there any scheduled maintenance for S-567?')\n\
- Maintenance history (e.g., 'What is the maintenance history for transformer T-123?')\n\
- Inspection reports (e.g., 'Show infrared inspection reports for T-789')\n\
- Real-time readings (e.g., 'What is the voltage at substation S-567?')\n\
- Safety procedures (e.g., 'Show me safety guidelines for breaker racking')\n\
- Training materials (e.g., 'Is there training on DGA interpretation?')\n\
- Inventory information (e.g., 'What spare parts are available for breaker B-456?')\n\n\
Please ask specific questions related to PG&E substation operations.";

pub const OFF_TOPIC_MESSAGE: &str = "I'm designed to provide information specifically about PG&E substation operations and assets. I can help with questions about transformers, breakers, maintenance schedules, safety guidelines, and similar topics. Could you please ask a question related to our substation database?";

pub const GENERAL_MESSAGE: &str = "I can help you with information about substation assets, maintenance schedules, inspection reports, real-time data, safety guidelines, and more. Please ask a specific question about PG&E substations.";

pub const NOT_FOUND_MESSAGE: &str = "I couldn't find any information about that in our database. Please try a different query or be more specific.";

/// Rows fetched for one classified message
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Diagnostics(Vec<AssetDiagnostic>),
    WorkOrders(Vec<WorkOrder>),
    History(Vec<MaintenanceRecord>),
    Inspections(Vec<InspectionReport>),
    Predictions(Vec<PredictiveRecommendation>),
    Readings(Vec<SensorReading>),
    Safety(Vec<SafetyGuideline>),
    Training(Vec<TrainingMaterial>),
    Incidents(Vec<IncidentReport>),
    Inventory(Vec<InventoryItem>),
    Search(SearchResults),
    /// Nothing to look up (greeting, help, off-topic)
    None,
}

impl Lookup {
    pub fn len(&self) -> usize {
        match self {
            Lookup::Diagnostics(v) => v.len(),
            Lookup::WorkOrders(v) => v.len(),
            Lookup::History(v) => v.len(),
            Lookup::Inspections(v) => v.len(),
            Lookup::Predictions(v) => v.len(),
            Lookup::Readings(v) => v.len(),
            Lookup::Safety(v) => v.len(),
            Lookup::Training(v) => v.len(),
            Lookup::Incidents(v) => v.len(),
            Lookup::Inventory(v) => v.len(),
            Lookup::Search(r) => r.total(),
            Lookup::None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `4/5/2025`
fn short_date(d: NaiveDate) -> String {
    format!("{}/{}/{}", d.month(), d.day(), d.year())
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Singular line for one row, or the "I found information about N ..." summary.
fn summarize<T>(rows: &[T], what: &str, line: impl Fn(&T) -> String) -> String {
    match rows {
        [one] => line(one),
        _ => format!(
            "I found information about {} {}: {}",
            rows.len(),
            what,
            rows.iter().map(line).collect::<Vec<_>>().join(" ")
        ),
    }
}

fn diagnostic_line(d: &AssetDiagnostic) -> String {
    let score = match d.health_score {
        Some(score) => format!("has a health score of {score}"),
        None => "has no health score on record".to_string(),
    };
    format!(
        "{} {}. Last diagnostic on {}. {}",
        d.asset_name,
        score,
        short_date(d.last_diagnostic_date.date()),
        d.diagnostic_summary
    )
}

fn work_order_line(w: &WorkOrder) -> String {
    format!(
        "{} has {} maintenance on {}: {}",
        w.asset_name,
        w.work_order_status.label(),
        w.scheduled_date,
        w.maintenance_details
    )
}

fn history_line(m: &MaintenanceRecord) -> String {
    format!(
        "{} maintenance on {}: {}",
        m.asset_name, m.maintenance_date, m.maintenance_log
    )
}

fn inspection_line(r: &InspectionReport) -> String {
    format!(
        "{} {} inspection on {} by {}: {}",
        r.asset_name,
        r.inspection_type.label(),
        r.report_date,
        r.inspector_name,
        r.report_summary
    )
}

fn prediction_line(p: &PredictiveRecommendation) -> String {
    format!(
        "{} has a {} risk level as of {}. {} Sensor data: {}",
        p.asset_name,
        p.risk_level.label(),
        p.prediction_date,
        p.recommendation_details,
        p.sensor_data_summary
    )
}

fn reading_line(r: &SensorReading) -> String {
    let unit = r.unit();
    let value = if unit.is_empty() {
        r.value.to_string()
    } else {
        format!("{} {}", r.value, unit)
    };
    format!(
        "{}: {} as of {}",
        r.sensor_type,
        value,
        r.measurement_time.format("%-I:%M:%S %p")
    )
}

fn safety_line(g: &SafetyGuideline) -> String {
    format!(
        "For {}, required PPE: {}. {} {}",
        g.procedure_name, g.required_ppe, g.safety_instructions, g.compliance_notes
    )
}

fn training_line(t: &TrainingMaterial) -> String {
    let cert = if t.certification_required {
        " Certification required."
    } else {
        ""
    };
    format!(
        "{}: {} See {} ({}).{}",
        t.topic, t.content, t.reference_manual, t.url, cert
    )
}

fn incident_line(i: &IncidentReport) -> String {
    format!(
        "{} had a {} incident on {}. {} Potential causes: {}",
        i.asset_name, i.failure_type, i.incident_date, i.description, i.potential_causes
    )
}

fn inventory_line(i: &InventoryItem) -> String {
    format!(
        "{} for {}: {} available ({}) in {}",
        i.part_name, i.asset_name, i.available_quantity, i.order_status, i.location
    )
}

fn search_summary(r: &SearchResults) -> String {
    let sections = [
        ("Asset Diagnostics", r.asset_diagnostics.len()),
        ("Maintenance Work Orders", r.maintenance_orders.len()),
        ("Inspection Reports", r.inspection_reports.len()),
        (
            "Predictive Maintenance Recommendations",
            r.predictive_maintenance.len(),
        ),
        ("Inventory Items", r.inventory.len()),
    ];
    let mut out = String::from("Here's what I found:\n");
    for (label, n) in sections.into_iter().filter(|(_, n)| *n > 0) {
        out.push_str(&format!("\n{}: {} found", label, plural(n, "result")));
    }
    out
}

/// Fixed text for intents that never touch the dataset.
pub fn scripted(intent: Intent) -> &'static str {
    match intent {
        Intent::Greeting => GREETING_MESSAGE,
        Intent::Help => HELP_MESSAGE,
        Intent::OffTopic => OFF_TOPIC_MESSAGE,
        _ => GENERAL_MESSAGE,
    }
}

/// Render the answer for `intent` from the rows in `lookup`.
pub fn render(intent: Intent, lookup: &Lookup) -> String {
    if intent.is_scripted() {
        return scripted(intent).to_string();
    }
    if lookup.is_empty() {
        return match intent {
            Intent::GeneralSearch => GENERAL_MESSAGE.to_string(),
            _ => NOT_FOUND_MESSAGE.to_string(),
        };
    }

    match lookup {
        Lookup::Diagnostics(rows) => summarize(rows, "assets. Here's a summary", diagnostic_line),
        Lookup::WorkOrders(rows) => summarize(rows, "scheduled maintenance tasks", work_order_line),
        Lookup::History(rows) => summarize(rows, "maintenance history records", history_line),
        Lookup::Inspections(rows) => summarize(rows, "inspection reports", inspection_line),
        Lookup::Predictions(rows) => {
            summarize(rows, "predictive maintenance recommendations", prediction_line)
        }
        Lookup::Readings(rows) => match rows.as_slice() {
            [one] => reading_line(one),
            _ => format!(
                "Current readings for {}: {}",
                rows[0].substation_id,
                rows.iter().map(reading_line).collect::<Vec<_>>().join(", ")
            ),
        },
        Lookup::Safety(rows) => match rows.as_slice() {
            [one] => safety_line(one),
            _ => format!(
                "Safety guidelines for {} procedures: {}",
                rows.len(),
                rows.iter().map(safety_line).collect::<Vec<_>>().join(" ")
            ),
        },
        Lookup::Training(rows) => summarize(rows, "training materials", training_line),
        Lookup::Incidents(rows) => summarize(rows, "incident reports", incident_line),
        Lookup::Inventory(rows) => summarize(rows, "inventory items", inventory_line),
        Lookup::Search(results) => search_summary(results),
        Lookup::None => GENERAL_MESSAGE.to_string(),
    }
}
