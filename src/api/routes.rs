//! API route handlers.
//!
//! All endpoints return JSON. Failures use `{"type": "error", "message"}`
//! with a status code derived from the underlying `DealError`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analysis::DealOverrides;
use crate::engine::{AnalyzeOptions, DealPipeline, MessageOutcome, PipelineReport};
use crate::report::format_report;
use crate::types::{Comparable, DealAnalysis, DealError, PropertyInfo, RepairEstimate};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct ApiState {
    pub pipeline: DealPipeline,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl ApiState {
    pub fn new(pipeline: DealPipeline) -> Self {
        Self {
            pipeline,
            started_at: chrono::Utc::now(),
        }
    }
}

pub type AppState = Arc<ApiState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

fn status_for(err: &DealError) -> StatusCode {
    match err {
        DealError::InsufficientData { .. } | DealError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
        DealError::PropertyNotFound(_) => StatusCode::NOT_FOUND,
        DealError::Listing { .. } | DealError::Commentary { .. } => StatusCode::BAD_GATEWAY,
        DealError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = err
            .downcast_ref::<DealError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<DealError> for ApiError {
    fn from(err: DealError) -> Self {
        Self {
            status: status_for(&err),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "Request rejected");
        }
        let body = Json(json!({"type": "error", "message": self.message}));
        (self.status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AnalyzeRequest {
    /// Property address; takes precedence over `message`.
    pub address: Option<String>,
    /// Free text that may name an address.
    pub message: Option<String>,
    pub arv: Option<Decimal>,
    pub repair_costs: Option<Decimal>,
    pub use_comparables: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub property: PropertyInfo,
    #[serde(default)]
    pub comparables: Vec<Comparable>,
    #[serde(default)]
    pub arv: Option<Decimal>,
    #[serde(default)]
    pub repair_costs: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisBody {
    pub address: String,
    pub property_data: PropertyInfo,
    pub deal_analysis: DealAnalysis,
    pub repair_estimate: RepairEstimate,
    pub report: String,
    pub ai_analysis: Option<String>,
    pub comparables_used: usize,
}

impl From<PipelineReport> for AnalysisBody {
    fn from(r: PipelineReport) -> Self {
        Self {
            address: r.address,
            property_data: r.property,
            deal_analysis: r.analysis,
            repair_estimate: r.repair_estimate,
            report: r.report,
            ai_analysis: r.commentary,
            comparables_used: r.comparables_used,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzeResponse {
    Analysis(Box<AnalysisBody>),
    Conversation { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    pub analysis: DealAnalysis,
    pub report: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(req) = payload?;
    let pipeline = &state.pipeline;

    let address = req.address.as_deref().map(str::trim).filter(|a| !a.is_empty());
    if let Some(address) = address {
        info!(address, "Analyze request");
        let options = AnalyzeOptions {
            overrides: DealOverrides {
                arv: req.arv,
                repair_costs: req.repair_costs,
            },
            use_comparables: req.use_comparables,
            user_query: req.message.clone(),
        };
        let report = pipeline.analyze_address(address, &options).await?;
        return Ok(Json(AnalyzeResponse::Analysis(Box::new(report.into()))));
    }

    let message = req.message.as_deref().map(str::trim).unwrap_or("");
    if message.is_empty() {
        return Err(ApiError::bad_request("No address or message provided"));
    }

    let response = match pipeline.handle_message(message).await? {
        MessageOutcome::Analysis(report) => AnalyzeResponse::Analysis(Box::new((*report).into())),
        MessageOutcome::Conversation(message) => AnalyzeResponse::Conversation { message },
    };
    Ok(Json(response))
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = payload?;
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("No message provided"));
    }
    let reply = state.pipeline.chat(&req.message).await?;
    Ok(Json(json!({"type": "chat", "message": reply})))
}

/// POST /api/evaluate: grade a caller-supplied property without any I/O.
pub async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let Json(req) = payload?;
    let overrides = DealOverrides {
        arv: req.arv,
        repair_costs: req.repair_costs,
    };
    let analysis =
        state
            .pipeline
            .analyzer()
            .analyze_with_overrides(&req.property, &req.comparables, overrides)?;
    let report = format_report(&analysis);
    Ok(Json(EvaluateResponse { analysis, report }))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds();
    Json(json!({
        "status": "ok",
        "commentary": state.pipeline.has_commentator(),
        "uptime_secs": uptime,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
