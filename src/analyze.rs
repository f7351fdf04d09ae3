//! Analysis orchestration: the request-level state machine.
//!
//! A request walks four stages with named terminal outcomes, replacing the
//! nested catch-blocks such services usually grow:
//!
//! ```text
//! Precondition ──▶ Input ──▶ Invoke ──▶ Parse
//!      │             │          │          └─ Ok(Analysis)           (always)
//!      │             │          └─ Err(ModelInvocation)   (direct + fallback spent)
//!      │             └─ Err(NoFile)                     (enforced at the boundary)
//!      └─ Err(MissingApiKey)                            (model never invoked)
//! ```
//!
//! ## Fallback policy
//!
//! The text-fallback branch runs only when the direct multimodal call
//! failed AND the media type has a text layer to pull (PDF). Whatever
//! goes wrong inside that branch — extraction or the second model call —
//! the *original* direct-invocation error propagates: a secondary failure
//! is never a better diagnostic than the root cause.

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::encode::{self, UploadedDocument};
use crate::pipeline::extract::{self, PdfTextExtractor, TextExtractor};
use crate::pipeline::model::{GeminiClient, GenerativeModel, InvocationMode};
use crate::pipeline::parse;
use crate::prompts;
use crate::report::AnalysisOutcome;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A finished analysis: the parse outcome plus which invocation shape
/// produced the raw text, so callers (and tests) can see the path taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub outcome: AnalysisOutcome,
    pub mode: InvocationMode,
}

/// The report-analysis pipeline. Stateless across requests: each
/// [`analyze`](AnalysisPipeline::analyze) call is independent, so one
/// instance can serve any number of concurrent requests.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    /// Pre-built model override. When `None`, a [`GeminiClient`] is built
    /// per request from the freshly resolved API key.
    model: Option<Arc<dyn GenerativeModel>>,
    extractor: Arc<dyn TextExtractor>,
}

impl AnalysisPipeline {
    /// Pipeline with the production Gemini client and PDF text extractor.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            model: None,
            extractor: Arc::new(PdfTextExtractor),
        }
    }

    /// Replace the model capability (tests, alternative backends).
    pub fn with_model(mut self, model: Arc<dyn GenerativeModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Replace the fallback text extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// The pipeline's configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one uploaded report.
    ///
    /// # Errors
    /// - [`AnalysisError::MissingApiKey`] — credential absent; the model is
    ///   never invoked.
    /// - [`AnalysisError::ModelInvocation`] — the direct call failed and
    ///   the fallback path was ineligible or also failed; carries the
    ///   direct call's cause.
    ///
    /// Decode problems are not errors: they return
    /// [`AnalysisOutcome::Degraded`] inside `Ok`.
    pub async fn analyze(&self, doc: UploadedDocument) -> Result<Analysis, AnalysisError> {
        // ── Precondition: credential must resolve before anything runs ───
        let api_key = self.config.resolve_api_key()?;

        let model: Arc<dyn GenerativeModel> = match &self.model {
            Some(m) => Arc::clone(m),
            None => Arc::new(GeminiClient::new(api_key, &self.config)?),
        };

        info!(
            filename = %doc.filename,
            media_type = %doc.media_type,
            size = doc.bytes.len(),
            "Analyze request started"
        );

        // ── Invoke: direct multimodal, then eligible fallback ────────────
        let encoded = encode::encode(&doc);
        let (raw, mode) = match model
            .generate_with_media(&encoded.payload_b64, &encoded.media_type, &prompts::direct_prompt())
            .await
        {
            Ok(raw) => (raw, InvocationMode::Direct),
            Err(direct_err) => {
                self.try_text_fallback(&model, &doc, direct_err).await?
            }
        };

        // ── Parse: always succeeds at this level ─────────────────────────
        let outcome = parse::parse(&raw);
        if outcome.is_degraded() {
            info!(?mode, "Analysis finished degraded (unparseable model output)");
        } else {
            info!(
                ?mode,
                biomarkers = outcome.report().results.len(),
                score = outcome.report().score,
                "Analysis finished"
            );
        }

        Ok(Analysis { outcome, mode })
    }

    /// Run the text-fallback branch, preserving `direct_err` as the only
    /// error this branch is allowed to surface.
    async fn try_text_fallback(
        &self,
        model: &Arc<dyn GenerativeModel>,
        doc: &UploadedDocument,
        direct_err: AnalysisError,
    ) -> Result<(String, InvocationMode), AnalysisError> {
        if !extract::is_extraction_eligible(&doc.media_type) {
            warn!(
                media_type = %doc.media_type,
                error = %direct_err,
                "Direct invocation failed; media type ineligible for text fallback"
            );
            return Err(direct_err);
        }

        warn!(error = %direct_err, "Direct invocation failed; falling back to text extraction");

        let text = match self.extractor.extract_text(&doc.bytes) {
            Ok(t) => t,
            Err(extract_err) => {
                warn!(
                    error = %extract_err,
                    "Text extraction failed; surfacing the original invocation error"
                );
                return Err(direct_err);
            }
        };
        debug!(extracted_chars = text.len(), "Text layer extracted");

        match model.generate_text(&prompts::text_fallback_prompt(&text)).await {
            Ok(raw) => Ok((raw, InvocationMode::TextFallback)),
            Err(text_err) => {
                warn!(
                    error = %text_err,
                    "Text-mode invocation failed; surfacing the original invocation error"
                );
                Err(direct_err)
            }
        }
    }
}
