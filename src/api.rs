//! HTTP API for the Quota Engine.
//!
//! This module exposes a minimal REST API around the quota calculator
//! using the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! submit a [`QuotaSubmission`] and receive the validated profile with
//! its [`QuotaResult`] in JSON, or a rendered report.  Input validation
//! happens here, before the engine runs.

use crate::engine::{compute_batch, compute_quota};
use crate::error::QuotaError;
use crate::intake::QuotaSubmission;
use crate::models::{CompanyProfile, QuotaResult};
use crate::report::{FallbackRenderer, JsonRenderer, PlainTextRenderer, ReportDocument};
use crate::rules::{load_rules, QuotaRules};
use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Application state shared across requests.  Everything here is
/// read-only once the server starts.
pub struct AppState {
    pub rules: QuotaRules,
    pub text_reports: FallbackRenderer,
    pub json_reports: FallbackRenderer,
}

impl AppState {
    pub fn new(rules: QuotaRules) -> Self {
        Self {
            rules,
            text_reports: FallbackRenderer::default(),
            json_reports: FallbackRenderer::new(vec![
                Arc::new(JsonRenderer),
                Arc::new(PlainTextRenderer),
            ]),
        }
    }
}

/// Response body for a single calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaResponse {
    pub profile: CompanyProfile,
    pub result: QuotaResult,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    Quota(QuotaError),
    Internal(String),
}

impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        ApiError::Quota(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Quota(err) if err.is_invalid_input() => {
                tracing::warn!(error = %err, "rejected quota submission");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::Quota(err) => {
                tracing::error!(error = %err, "quota request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "quota request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Build the API router around the given rule table.
pub fn build_router(rules: QuotaRules) -> Router {
    let state = Arc::new(AppState::new(rules));
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/quota", post(quota_handler))
        .route("/api/quota/batch", post(batch_handler))
        .route("/api/quota/report", post(report_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Handler for POST /api/quota
async fn quota_handler(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<QuotaSubmission>,
) -> Result<Json<QuotaResponse>, ApiError> {
    let profile = submission.validate()?;
    let result = compute_quota(&profile, &state.rules);
    Ok(Json(QuotaResponse { profile, result }))
}

/// Handler for POST /api/quota/batch.  One invalid entry rejects the
/// whole batch.
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(submissions): Json<Vec<QuotaSubmission>>,
) -> Result<Json<Vec<QuotaResult>>, ApiError> {
    let profiles = submissions
        .iter()
        .enumerate()
        .map(|(index, submission)| {
            submission.validate().map_err(|err| match err {
                QuotaError::InvalidInput { field, reason } => {
                    QuotaError::invalid_input(format!("[{index}].{field}"), reason)
                }
                other => other,
            })
        })
        .collect::<Result<Vec<CompanyProfile>, QuotaError>>()?;

    tracing::debug!(count = profiles.len(), "computing quota batch");
    let results = tokio::task::spawn_blocking(move || compute_batch(&profiles, &state.rules))
        .await
        .map_err(|err| ApiError::Internal(format!("batch computation aborted: {err}")))?;
    Ok(Json(results))
}

/// Handler for POST /api/quota/report
async fn report_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportQuery>,
    Json(submission): Json<QuotaSubmission>,
) -> Result<Response, ApiError> {
    let profile = submission.validate()?;
    let result = compute_quota(&profile, &state.rules);
    let doc = ReportDocument::build(&profile, &result);
    let renderers = match query.format {
        ReportFormat::Text => &state.text_reports,
        ReportFormat::Json => &state.json_reports,
    };
    let report = renderers.render(&doc);
    let headers = [
        (header::CONTENT_TYPE, report.content_type.to_string()),
        (
            HeaderName::from_static("x-report-renderer"),
            report.renderer.clone(),
        ),
    ];
    Ok((StatusCode::OK, headers, report.body).into_response())
}

/// Launch the API server.  Loads the rule table (or the statutory
/// defaults), binds to `addr` and serves until the process is
/// interrupted.
pub async fn serve(addr: &str, rules_path: Option<&Path>) -> Result<()> {
    let rules = match rules_path {
        Some(path) => load_rules(path)?,
        None => QuotaRules::default(),
    };
    let router = build_router(rules);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "quota server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
