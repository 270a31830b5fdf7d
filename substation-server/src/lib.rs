//! substation-server: REST layer for the substation operations assistant.

pub mod chat;
pub mod error;
pub mod llm;
pub mod substation;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{Method, Uri};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use substation_core::{Assistant, Dataset};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use chat::{respond, ChatFallback, ChatQuery, ChatReply, ChatSettings, FallbackMode, ReplySource};
pub use error::ApiError;
pub use llm::LlmSettings;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Request bodies above this size are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Serve this directory at `/` instead of the built-in chat page
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4477,
            static_dir: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub fallback: Arc<ChatFallback>,
}

impl AppState {
    pub fn new(assistant: Assistant, chat: ChatSettings) -> Self {
        Self {
            assistant: Arc::new(assistant),
            fallback: Arc::new(ChatFallback::new(chat)),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        self.assistant.dataset()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found(method: Method, uri: Uri) -> ApiError {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    ApiError::NoRoute {
        method: method.to_string(),
        path,
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/api/chat/query", post(chat::query))
        .nest("/api/substation", substation::routes());

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir)
                .call_fallback_on_method_not_allowed(true)
                .fallback(not_found.into_service()),
        ),
        None => router.route("/", get(index)).fallback(not_found),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "substation assistant listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use substation_core::AssistantSettings;
    use tower::ServiceExt;

    fn app() -> Router {
        app_with(ChatSettings {
            fallback: FallbackMode::None,
            ..ChatSettings::default()
        })
    }

    fn app_with(chat: ChatSettings) -> Router {
        let assistant = Assistant::new(
            Dataset::builtin(),
            AssistantSettings {
                seed: Some(1),
                ..AssistantSettings::default()
            },
        );
        build_router(AppState::new(assistant, chat), &ServerConfig::default())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_chat(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat/query")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint_reports_ok() {
        let (status, body) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn chat_query_answers_from_dataset() {
        let (status, body) = post_chat(
            app(),
            serde_json::json!({ "message": "What is the health status of transformer T-123?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], "asset_health");
        assert_eq!(body["entity"]["kind"], "asset");
        assert_eq!(body["entity"]["value"], "T-123");
        assert_eq!(body["source"], "dataset");
        assert!(body["response"].as_str().unwrap().contains("92.5"));
    }

    #[tokio::test]
    async fn chat_query_requires_message() {
        let (status, body) = post_chat(app(), serde_json::json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");

        let (status, _) = post_chat(app(), serde_json::json!({ "message": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn off_topic_goes_to_canned_fallback() {
        let (status, body) = post_chat(
            app_with(ChatSettings::default()),
            serde_json::json!({ "message": "Will it rain tomorrow?" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], "off_topic");
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["response"], substation_core::canned::DEFAULT);
    }

    #[tokio::test]
    async fn off_topic_without_fallback_is_scripted() {
        let (_, body) =
            post_chat(app(), serde_json::json!({ "message": "Will it rain tomorrow?" })).await;
        assert_eq!(body["source"], "scripted");
        assert_eq!(body["response"], substation_core::respond::OFF_TOPIC_MESSAGE);
    }

    #[tokio::test]
    async fn asset_health_route_and_404() {
        let (status, body) = get_json(app(), "/api/substation/asset/B-456/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["health_score"], 85.0);
        assert_eq!(body["last_diagnostic_date"], "2025-04-04 14:20:00");

        let (status, body) = get_json(app(), "/api/substation/asset/T-000/health").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No health data found for asset: T-000");
    }

    #[tokio::test]
    async fn maintenance_history_limit() {
        let (_, body) = get_json(app(), "/api/substation/asset/T-123/maintenance-history").await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["history_id"], 2001);

        let (_, body) =
            get_json(app(), "/api/substation/asset/T-123/maintenance-history?limit=1").await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) =
            get_json(app(), "/api/substation/asset/T-123/maintenance-history?limit=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inspection_reports_type_filter() {
        let (_, body) =
            get_json(app(), "/api/substation/asset/B-456/inspection-reports?type=Visual").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["inspection_type"], "Visual");

        let (_, body) =
            get_json(app(), "/api/substation/asset/B-456/inspection-reports?type=Infrared").await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn real_time_and_scheduled_routes() {
        let (_, body) = get_json(app(), "/api/substation/S-567/real-time-data").await;
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["measurement_time"], "2025-04-05 09:00:00");

        let (_, body) = get_json(app(), "/api/substation/maintenance/scheduled/substation").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["work_order_id"], 1002);
    }

    #[tokio::test]
    async fn safety_training_and_parts() {
        let (status, body) = get_json(app(), "/api/substation/safety/breaker%20racking").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["required_PPE"], "Hard hat, safety glasses, gloves");

        let (status, _) = get_json(app(), "/api/substation/safety/crane").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get_json(app(), "/api/substation/training?topic=infrared").await;
        assert_eq!(body[0]["training_id"], 8002);

        let (_, body) = get_json(app(), "/api/substation/asset/B-456/spare-parts").await;
        assert_eq!(body[0]["part_name"], "Replacement Contacts");
    }

    #[tokio::test]
    async fn search_requires_keyword() {
        let (status, body) = get_json(app(), "/api/substation/search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Keyword parameter is required");

        let (status, body) = get_json(app(), "/api/substation/search?keyword=oil").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["maintenanceOrders"].is_array());
        assert!(!body["predictiveMaintenance"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = get_json(app(), "/api/nothing?x=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Cannot GET /api/nothing?x=1");
    }

    #[tokio::test]
    async fn index_serves_chat_page() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/chat/query"));
    }

    async fn post_raw(
        app: Router,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method("POST").uri("/api/chat/query");
        if let Some(ct) = content_type {
            request = request.header("content-type", ct);
        }
        let response = app
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unusable_chat_bodies_get_json_400() {
        let cases = [
            (None, r#"{"message":"hello"}"#),
            (Some("application/json"), "not json"),
            (Some("application/json"), r#"{"message": 5}"#),
        ];
        for (content_type, body) in cases {
            let (status, json) = post_raw(app(), content_type, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert_eq!(json, serde_json::json!({ "error": "Message is required" }));
        }
    }

    #[tokio::test]
    async fn predictions_and_incidents_routes() {
        let (status, body) = get_json(app(), "/api/substation/asset/B-456/predictions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["recommendation_id"], 4003);
        assert_eq!(body[0]["risk_level"], "Low");

        let (_, body) = get_json(app(), "/api/substation/asset/B-456/incidents").await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["incident_id"], 9002);
        assert_eq!(body[0]["failure_type"], "Mechanical Failure");

        let (status, body) = get_json(app(), "/api/substation/asset/T-000/incidents").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://ops.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn static_dir_serves_files_with_json_404() {
        let dir = std::env::temp_dir().join(format!("substation-static-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<h1>ops console</h1>").unwrap();

        let assistant = Assistant::new(Dataset::builtin(), AssistantSettings::default());
        let config = ServerConfig {
            static_dir: Some(dir.clone()),
            ..ServerConfig::default()
        };
        let app = build_router(AppState::new(assistant, ChatSettings::default()), &config);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>ops console</h1>");

        let (status, body) = get_json(app.clone(), "/missing.js").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Cannot GET /missing.js");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Cannot POST /nowhere");

        let (status, _) = get_json(app, "/api/substation/asset/T-123/health").await;
        assert_eq!(status, StatusCode::OK);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let big = "x".repeat(BODY_LIMIT_BYTES + 1);
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat/query")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::json!({ "message": big }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Request body too large");
    }
}
