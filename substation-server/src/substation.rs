//! `/api/substation/*`: direct table lookups returning raw rows.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use substation_core::{
    AssetDiagnostic, IncidentReport, InspectionReport, InspectionType, InventoryItem,
    MaintenanceRecord, PredictiveRecommendation, SafetyGuideline, SearchResults, SensorReading,
    TrainingMaterial, WorkOrder, DEFAULT_HISTORY_LIMIT,
};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/asset/:asset_id/health", get(asset_health))
        .route(
            "/asset/:asset_id/maintenance-history",
            get(maintenance_history),
        )
        .route("/asset/:asset_id/inspection-reports", get(inspection_reports))
        .route("/asset/:asset_id/spare-parts", get(spare_parts))
        .route("/asset/:asset_id/predictions", get(predictions))
        .route("/asset/:asset_id/incidents", get(incidents))
        .route("/maintenance/scheduled/:location", get(scheduled_maintenance))
        .route("/safety/:procedure", get(safety_guidelines))
        .route("/training", get(training))
        .route("/search", get(search))
        .route("/:substation_id/real-time-data", get(real_time_data))
}

fn owned<T: Clone>(rows: Vec<&T>) -> Vec<T> {
    rows.into_iter().cloned().collect()
}

async fn asset_health(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<Json<AssetDiagnostic>, ApiError> {
    info!(asset_id = %asset_id, "asset health");
    state
        .dataset()
        .asset_health(&asset_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No health data found for asset: {asset_id}")))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<String>,
}

async fn maintenance_history(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<MaintenanceRecord>>, ApiError> {
    let limit = match params.limit.as_deref() {
        None | Some("") => DEFAULT_HISTORY_LIMIT,
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| ApiError::bad_query(format!("Invalid limit: {raw}")))?,
    };
    info!(asset_id = %asset_id, limit, "maintenance history");
    Ok(Json(owned(
        state.dataset().maintenance_history(&asset_id, limit),
    )))
}

#[derive(Debug, Deserialize)]
struct InspectionParams {
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn inspection_reports(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    Query(params): Query<InspectionParams>,
) -> Result<Json<Vec<InspectionReport>>, ApiError> {
    let kind = match params.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            InspectionType::parse(raw)
                .ok_or_else(|| ApiError::bad_query(format!("Unknown inspection type: {raw}")))?,
        ),
    };
    info!(asset_id = %asset_id, kind = ?kind, "inspection reports");
    Ok(Json(owned(
        state.dataset().inspection_reports(&asset_id, kind),
    )))
}

async fn spare_parts(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Json<Vec<InventoryItem>> {
    info!(asset_id = %asset_id, "spare parts");
    Json(owned(state.dataset().spare_parts_for(&asset_id)))
}

async fn predictions(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Json<Vec<PredictiveRecommendation>> {
    Json(owned(state.dataset().predictions_for(&asset_id)))
}

async fn incidents(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Json<Vec<IncidentReport>> {
    Json(owned(state.dataset().incidents_for(&asset_id)))
}

async fn scheduled_maintenance(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Json<Vec<WorkOrder>> {
    info!(location = %location, "scheduled maintenance");
    Json(owned(state.dataset().scheduled_maintenance(&location)))
}

async fn real_time_data(
    State(state): State<AppState>,
    Path(substation_id): Path<String>,
) -> Json<Vec<SensorReading>> {
    info!(substation_id = %substation_id, "real-time data");
    Json(owned(state.dataset().real_time_data(&substation_id)))
}

async fn safety_guidelines(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
) -> Result<Json<SafetyGuideline>, ApiError> {
    info!(procedure = %procedure, "safety guidelines");
    state
        .dataset()
        .safety_guideline(&procedure)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!(
                "No safety guidelines found for procedure: {procedure}"
            ))
        })
}

#[derive(Debug, Deserialize)]
struct TrainingParams {
    topic: Option<String>,
}

async fn training(
    State(state): State<AppState>,
    Query(params): Query<TrainingParams>,
) -> Json<Vec<TrainingMaterial>> {
    let db = state.dataset();
    Json(match params.topic.as_deref().map(str::trim) {
        Some(topic) if !topic.is_empty() => owned(db.training_for(topic)),
        _ => db.training_materials.clone(),
    })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    keyword: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let keyword = params
        .keyword
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_query("Keyword parameter is required"))?;
    info!(keyword = %keyword, "search");
    Ok(Json(state.dataset().search(&keyword)))
}
