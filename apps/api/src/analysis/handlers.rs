//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::analysis::models::{AnalysisMode, AnalysisOutcome, AnalysisRequest};
use crate::analysis::render::{render_markdown, RadarChart};
use crate::errors::AppError;
use crate::llm_client::Provider;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(default)]
    pub format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub request_id: Uuid,
    pub mode: AnalysisMode,
    pub provider: Provider,
    pub model: String,
    pub generated_at: DateTime<Utc>,
    pub result: AnalysisOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<RadarChart>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisConfigResponse {
    pub provider: Provider,
    pub model: String,
    pub mode: AnalysisMode,
    pub credential_configured: bool,
    pub max_upload_bytes: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart form: `resume` (PDF file) and `job_description` (text).
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let request_id = Uuid::new_v4();
    let mut resume = Bytes::new();
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                resume = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid resume upload: {e}")))?;
            }
            Some("job_description") => {
                job_description = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Invalid job_description field: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let outcome = state
        .analyzer
        .analyze_document(resume, &job_description)
        .instrument(info_span!("analysis", %request_id, source = "upload"))
        .await?;

    Ok(respond(&state, request_id, outcome, query.format))
}

/// POST /api/v1/analyze/text
///
/// JSON body with already-extracted resume text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Query(query): Query<FormatQuery>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Response, AppError> {
    let request_id = Uuid::new_v4();

    let outcome = state
        .analyzer
        .analyze_text(&request)
        .instrument(info_span!("analysis", %request_id, source = "text"))
        .await?;

    Ok(respond(&state, request_id, outcome, query.format))
}

/// GET /api/v1/analyze/config
///
/// Reports the active integration. Never includes the API key itself.
pub async fn handle_analysis_config(State(state): State<AppState>) -> Json<AnalysisConfigResponse> {
    let analyzer = &state.analyzer;
    Json(AnalysisConfigResponse {
        provider: analyzer.provider(),
        model: analyzer.params().model.clone(),
        mode: analyzer.mode(),
        credential_configured: analyzer.has_credential(),
        max_upload_bytes: state.config.max_upload_bytes,
    })
}

fn respond(
    state: &AppState,
    request_id: Uuid,
    outcome: AnalysisOutcome,
    format: ResponseFormat,
) -> Response {
    match format {
        ResponseFormat::Markdown => (
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            render_markdown(&outcome),
        )
            .into_response(),
        ResponseFormat::Json => {
            let chart = match &outcome {
                AnalysisOutcome::Structured(result) => {
                    Some(RadarChart::from_skill_matches(&result.skill_matches))
                }
                AnalysisOutcome::Freeform(_) => None,
            };
            Json(AnalysisResponse {
                request_id,
                mode: state.analyzer.mode(),
                provider: state.analyzer.provider(),
                model: state.analyzer.params().model.clone(),
                generated_at: Utc::now(),
                result: outcome,
                chart,
            })
            .into_response()
        }
    }
}
