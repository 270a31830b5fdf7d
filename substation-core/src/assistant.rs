//! The chat pipeline: classify, look up, fall back to synthetic rows, render.

use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{Dataset, SearchResults};
use crate::entity::Entity;
use crate::intent::{classify, Classification, Intent};
use crate::respond::{render, Lookup};
use crate::synthetic::SyntheticGenerator;

/// Default number of maintenance history rows in an answer
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Fabricate a record when an asked-for ID has no rows
    pub synthetic_fallback: bool,
    pub history_limit: usize,
    /// Fixed RNG seed for the synthetic generator
    pub seed: Option<u64>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            synthetic_fallback: true,
            history_limit: DEFAULT_HISTORY_LIMIT,
            seed: None,
        }
    }
}

/// Where an answer's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    Dataset,
    Synthetic,
    /// Fixed text: greeting, help, off-topic, or nothing found
    Scripted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub intent: Intent,
    pub entity: Option<Entity>,
    pub source: AnswerSource,
}

impl Answer {
    /// The rule chain had nothing useful to say; a caller may try another
    /// responder (canned replies, an LLM).
    pub fn needs_fallback(&self) -> bool {
        match self.intent {
            Intent::OffTopic => true,
            Intent::GeneralSearch => self.source == AnswerSource::Scripted,
            _ => false,
        }
    }
}

pub struct Assistant {
    dataset: Arc<Dataset>,
    settings: AssistantSettings,
    generator: Mutex<SyntheticGenerator>,
}

impl Assistant {
    pub fn new(dataset: impl Into<Arc<Dataset>>, settings: AssistantSettings) -> Self {
        let generator = match settings.seed {
            Some(seed) => SyntheticGenerator::seeded(seed),
            None => SyntheticGenerator::from_entropy(),
        };
        Self {
            dataset: dataset.into(),
            settings,
            generator: Mutex::new(generator),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn answer(&self, message: &str) -> Answer {
        self.answer_at(message, Local::now().naive_local())
    }

    /// Answer as if the current time were `now` (synthetic dates are relative to it).
    pub fn answer_at(&self, message: &str, now: NaiveDateTime) -> Answer {
        let c = classify(message);
        debug!(intent = %c.intent, entity = ?c.entity, "classified message");

        if c.intent.is_scripted() {
            return Answer {
                text: render(c.intent, &Lookup::None),
                intent: c.intent,
                entity: c.entity,
                source: AnswerSource::Scripted,
            };
        }

        let mut lookup = self.lookup(&c);
        let mut source = AnswerSource::Dataset;

        if lookup.is_empty() && self.settings.synthetic_fallback {
            if let Some(fabricated) = self.fabricate(&c, now) {
                debug!(intent = %c.intent, entity = ?c.entity, "no rows; using synthetic record");
                lookup = fabricated;
                source = AnswerSource::Synthetic;
            }
        }
        if lookup.is_empty() {
            source = AnswerSource::Scripted;
        }

        Answer {
            text: render(c.intent, &lookup),
            intent: c.intent,
            entity: c.entity,
            source,
        }
    }

    /// Rows for a classification. Without an entity the whole table answers.
    pub fn lookup(&self, c: &Classification) -> Lookup {
        let db = &*self.dataset;
        let id = c.entity.as_ref().and_then(Entity::equipment_id);

        match c.intent {
            Intent::AssetHealth => Lookup::Diagnostics(match id {
                Some(id) => db.asset_health(id).into_iter().cloned().collect(),
                None => db.asset_diagnostics.clone(),
            }),
            Intent::MaintenanceSchedule => Lookup::WorkOrders(match id {
                Some(id) => db.work_orders_for(id).into_iter().cloned().collect(),
                None => db.work_orders.clone(),
            }),
            Intent::MaintenanceHistory => {
                let limit = c.limit.unwrap_or(self.settings.history_limit);
                Lookup::History(match id {
                    Some(id) => db.maintenance_history(id, limit).into_iter().cloned().collect(),
                    None => {
                        let mut rows = db.maintenance_history.clone();
                        rows.sort_by(|a, b| b.maintenance_date.cmp(&a.maintenance_date));
                        rows.truncate(limit);
                        rows
                    }
                })
            }
            Intent::InspectionReport => Lookup::Inspections(match id {
                Some(id) => db
                    .inspection_reports(id, c.inspection_type)
                    .into_iter()
                    .cloned()
                    .collect(),
                None => db
                    .inspection_reports
                    .iter()
                    .filter(|r| c.inspection_type.is_none_or(|t| r.inspection_type == t))
                    .cloned()
                    .collect(),
            }),
            Intent::PredictiveMaintenance => Lookup::Predictions(match id {
                Some(id) => db.predictions_for(id).into_iter().cloned().collect(),
                None => db.predictive_maintenance.clone(),
            }),
            Intent::RealTimeData => {
                let rows: Vec<_> = match id {
                    Some(id) => db.real_time_data(id).into_iter().cloned().collect(),
                    None => db.real_time_data.clone(),
                };
                Lookup::Readings(
                    rows.into_iter()
                        .filter(|r| c.sensor.is_none_or(|s| r.kind() == Some(s)))
                        .collect(),
                )
            }
            Intent::SafetyGuidelines => Lookup::Safety(match &c.entity {
                Some(e) => db.safety_guideline(e.id()).into_iter().cloned().collect(),
                None => db.safety_guidelines.clone(),
            }),
            Intent::TrainingMaterials => Lookup::Training(match &c.entity {
                Some(e) => db.training_for(e.id()).into_iter().cloned().collect(),
                None => db.training_materials.clone(),
            }),
            Intent::Incidents => Lookup::Incidents(match id {
                Some(id) => db.incidents_for(id).into_iter().cloned().collect(),
                None => db.incident_reports.clone(),
            }),
            Intent::Inventory => Lookup::Inventory(match id {
                Some(id) => db.spare_parts_for(id).into_iter().cloned().collect(),
                None => db.inventory.clone(),
            }),
            Intent::GeneralSearch => {
                let mut results = SearchResults::default();
                let keywords = c.keywords.as_deref().unwrap_or_default();
                for term in keywords.split_whitespace() {
                    results.merge(db.search(term));
                }
                Lookup::Search(results)
            }
            Intent::Greeting | Intent::Help | Intent::OffTopic => Lookup::None,
        }
    }

    /// One made-up row for an ID the dataset does not know.
    fn fabricate(&self, c: &Classification, now: NaiveDateTime) -> Option<Lookup> {
        let id = c.entity.as_ref()?.equipment_id()?;
        let today = now.date();
        let mut g = self
            .generator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let lookup = match c.intent {
            Intent::AssetHealth => Lookup::Diagnostics(vec![g.asset_diagnostic(id, today)]),
            Intent::MaintenanceSchedule => Lookup::WorkOrders(vec![g.work_order(id, today)]),
            Intent::MaintenanceHistory => {
                Lookup::History(vec![g.maintenance_record(id, today)])
            }
            Intent::InspectionReport => Lookup::Inspections(vec![g.inspection_report(
                id,
                c.inspection_type,
                today,
            )]),
            Intent::PredictiveMaintenance => Lookup::Predictions(vec![g.prediction(id, today)]),
            Intent::RealTimeData => {
                let substation = c.entity.as_ref()?.substation_id()?;
                let rows = g
                    .sensor_readings(substation, now)
                    .into_iter()
                    .filter(|r| c.sensor.is_none_or(|s| r.kind() == Some(s)))
                    .collect();
                Lookup::Readings(rows)
            }
            Intent::Incidents => Lookup::Incidents(vec![g.incident(id, today)]),
            Intent::Inventory => Lookup::Inventory(vec![g.inventory_item(id)]),
            _ => return None,
        };
        Some(lookup)
    }
}
