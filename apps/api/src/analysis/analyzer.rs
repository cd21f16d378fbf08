//! Orchestration: validate → extract → prompt → call → normalize.
//!
//! The analyzer owns no per-request state. Transport and extractor are
//! injected so tests can substitute stubs.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::analysis::models::{AnalysisMode, AnalysisOutcome, AnalysisRequest};
use crate::analysis::normalizer::normalize;
use crate::analysis::prompts::{build, system_prompt};
use crate::errors::AnalysisError;
use crate::extraction::DocumentExtractor;
use crate::llm_client::{LlmError, ModelParams, ModelTransport, Provider};

pub struct Analyzer {
    transport: Arc<dyn ModelTransport>,
    extractor: Arc<dyn DocumentExtractor>,
    mode: AnalysisMode,
    params: ModelParams,
    timeout: Duration,
}

impl Analyzer {
    pub fn new(
        transport: Arc<dyn ModelTransport>,
        extractor: Arc<dyn DocumentExtractor>,
        mode: AnalysisMode,
        params: ModelParams,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            extractor,
            mode,
            params,
            timeout,
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn provider(&self) -> Provider {
        self.transport.provider()
    }

    pub fn has_credential(&self) -> bool {
        self.transport.has_credential()
    }

    /// Analyzes an uploaded resume document against a job description.
    pub async fn analyze_document(
        &self,
        document: Bytes,
        job_description: &str,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if document.is_empty() {
            return Err(AnalysisError::EmptyInput("resume"));
        }
        if job_description.trim().is_empty() {
            return Err(AnalysisError::EmptyInput("job_description"));
        }

        let resume_text = self.extractor.extract(document).await?;
        if resume_text.trim().is_empty() {
            warn!("Extractor returned no text for the uploaded resume");
            return Err(AnalysisError::EmptyInput("resume_text"));
        }

        self.analyze_text(&AnalysisRequest::new(resume_text, job_description))
            .await
    }

    /// Analyzes already-extracted resume text against a job description.
    pub async fn analyze_text(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        request.validate()?;

        if !self.transport.has_credential() {
            return Err(AnalysisError::MissingCredential(self.transport.provider()));
        }

        let prompt = build(request, self.mode);
        debug!(
            "Calling {} ({}) with {} char prompt",
            self.transport.provider(),
            self.params.model,
            prompt.len()
        );

        let call = self
            .transport
            .complete(&prompt, system_prompt(self.mode), &self.params);
        let raw = match tokio::time::timeout(self.timeout, call).await {
            Ok(reply) => reply?,
            Err(_) => return Err(LlmError::Timeout(self.timeout).into()),
        };

        match normalize(&raw, self.mode) {
            Ok(outcome) => {
                info!("Analysis complete ({} char reply)", raw.len());
                Ok(outcome)
            }
            Err(err) => {
                if let AnalysisError::MalformedResponse { raw, reason } = &err {
                    warn!("Malformed model reply ({reason}): {raw}");
                }
                Err(err)
            }
        }
    }
}
