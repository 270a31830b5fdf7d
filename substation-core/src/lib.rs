//! substation-core: Intent rules, sample data and answers for the substation operations assistant

pub mod assistant;
pub mod canned;
pub mod dataset;
pub mod entity;
pub mod intent;
pub mod records;
pub mod respond;
pub mod synthetic;

pub use assistant::{Answer, AnswerSource, Assistant, AssistantSettings, DEFAULT_HISTORY_LIMIT};
pub use dataset::{Dataset, SearchResults};
pub use entity::Entity;
pub use intent::{classify, Classification, Intent};
pub use records::{
    AssetDiagnostic, IncidentReport, InspectionReport, InspectionType, InventoryItem,
    MaintenanceRecord, PredictiveRecommendation, RiskLevel, SafetyGuideline, SensorKind,
    SensorReading, TrainingMaterial, WorkOrder, WorkOrderStatus,
};
pub use respond::{render, Lookup};
pub use synthetic::SyntheticGenerator;
