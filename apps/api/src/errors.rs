use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::render::render_error;
use crate::extraction::ExtractError;
use crate::llm_client::{LlmError, Provider};

/// Every way a single analysis request can fail.
/// All variants are terminal for the request; nothing here is retried.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error("Failed to extract text from document: {0}")]
    ExtractionFailed(#[from] ExtractError),

    #[error("No API key configured for provider '{0}'")]
    MissingCredential(Provider),

    #[error("Model transport failed: {0}")]
    TransportFailed(#[source] LlmError),

    /// `raw` is the model's reply exactly as received.
    #[error("Model returned a malformed response: {reason}")]
    MalformedResponse { raw: String, reason: String },
}

impl AnalysisError {
    pub fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        AnalysisError::MalformedResponse {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey(provider) => AnalysisError::MissingCredential(provider),
            other => AnalysisError::TransportFailed(other),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(err) => {
                let (status, code) = match err {
                    AnalysisError::EmptyInput(_) => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
                    AnalysisError::ExtractionFailed(e) => {
                        tracing::warn!("Extraction failed: {e}");
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED")
                    }
                    AnalysisError::MissingCredential(provider) => {
                        tracing::error!("No API key configured for {provider}");
                        (StatusCode::SERVICE_UNAVAILABLE, "MISSING_CREDENTIAL")
                    }
                    AnalysisError::TransportFailed(e) => {
                        tracing::error!("LLM transport error: {e}");
                        (StatusCode::BAD_GATEWAY, "TRANSPORT_FAILED")
                    }
                    AnalysisError::MalformedResponse { reason, .. } => {
                        tracing::error!("Malformed LLM response: {reason}");
                        (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE")
                    }
                };
                (status, code, render_error(err))
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
