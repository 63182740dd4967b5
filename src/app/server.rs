use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::{FileArchitectureDoc, GeminiBackend};
use crate::config::ServiceConfig;
use crate::core::invoker::ResilientInvoker;
use crate::domain::model::{ConversionRequest, ConversionResult};
use crate::domain::ports::ArchitectureDoc;
use crate::utils::error::{ErrorCategory, Result, SkedError};

pub const ARCHITECTURE_DOC_FILENAME: &str = "aeronautical_converter_architecture.pdf";

/// HTTP 處理器共用的唯讀狀態
#[derive(Clone)]
pub struct AppState {
    pub invoker: Arc<ResilientInvoker>,
    pub docs: Arc<dyn ArchitectureDoc>,
}

impl AppState {
    pub fn new(invoker: ResilientInvoker, docs: Arc<dyn ArchitectureDoc>) -> Self {
        Self {
            invoker: Arc::new(invoker),
            docs,
        }
    }

    /// 依設定組出 Gemini 後端、兩層呼叫與文件來源
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let backend = GeminiBackend::from_config(&config.backend)?;
        let invoker = ResilientInvoker::from_config(Arc::new(backend), &config.backend);
        let docs = FileArchitectureDoc::new(&config.docs.architecture_pdf);
        Ok(Self::new(invoker, Arc::new(docs)))
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    detail: String,
}

impl AppError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<SkedError> for AppError {
    fn from(err: SkedError) -> Self {
        let status = match err.category() {
            ErrorCategory::Input => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.detail });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/convert", post(convert_schedule))
        .route("/health", get(health_check))
        .route("/api/download-architecture-doc", get(download_architecture_doc))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = addr.parse().map_err(|e| SkedError::InvalidConfigValueError {
        field: "server".to_string(),
        value: addr.to_string(),
        reason: format!("Invalid bind address: {}", e),
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 sked-aixm listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("sked-aixm shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn convert_schedule(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ConversionRequest>, JsonRejection>,
) -> std::result::Result<Json<ConversionResult>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("⚠️ Rejected convert request body: {}", rejection.body_text());
        AppError::from(rejection)
    })?;
    tracing::info!("📥 Converting schedule ({} chars)", request.text.len());

    match state.invoker.convert(&request.text).await {
        Ok(result) => {
            if let Some(note) = &result.note {
                tracing::info!("✅ Conversion completed: {}", note);
            } else {
                tracing::info!("✅ Conversion completed");
            }
            Ok(Json(result))
        }
        Err(e) => {
            tracing::error!(
                "❌ Error processing schedule conversion: {} (Category: {:?})",
                e,
                e.category()
            );
            Err(e.into())
        }
    }
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

async fn download_architecture_doc(
    State(state): State<AppState>,
) -> std::result::Result<Response, AppError> {
    tracing::info!("Received request for architecture document.");

    let data = state.docs.load().await.map_err(|e| {
        tracing::error!("❌ Error serving architecture document: {}", e);
        AppError::internal(format!("Error creating PDF: {}", e))
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHITECTURE_DOC_FILENAME),
            ),
        ],
        data,
    )
        .into_response())
}
