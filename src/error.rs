//! Error types for the labsight analysis pipeline.
//!
//! The taxonomy follows one hard rule: everything that fails *before* the
//! model call is a hard error surfaced to the caller immediately, while
//! everything after the model has answered degrades instead of failing
//! (see [`crate::pipeline::parse`]). Once the latency and cost of an
//! external model call has been spent, a structured-but-empty result is
//! more useful than an opaque 500.
//!
//! [`AnalysisError::Extraction`] is internal to the fallback branch: when
//! text extraction fails, the pipeline re-raises the original direct
//! invocation error rather than the extraction failure, so callers always
//! see the root cause.

use thiserror::Error;

/// All hard errors returned by the labsight library.
///
/// Soft decode failures are not errors — they surface as
/// [`crate::report::AnalysisOutcome::Degraded`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// No model API key could be resolved from config or environment.
    /// Fatal for every request until the operator corrects it; never retried.
    #[error("Gemini API key not configured. Set GEMINI_API_KEY or provide a key in AnalysisConfig.")]
    MissingApiKey,

    // ── Input errors ──────────────────────────────────────────────────────
    /// The submitted form carried no `file` field. Client must resubmit.
    #[error("No file uploaded")]
    NoFile,

    // ── Model errors ──────────────────────────────────────────────────────
    /// The model rejected or failed both the direct call and (when eligible)
    /// the text-fallback call. Carries the underlying cause of the *direct*
    /// invocation, which is always the better diagnostic.
    #[error("Model invocation failed: {detail}")]
    ModelInvocation { detail: String },

    // ── Fallback-internal errors ──────────────────────────────────────────
    /// The PDF binary could not be parsed for a text layer (corrupt,
    /// encrypted, or scanned-image-only document). Swallowed by the
    /// pipeline and superseded by the original invocation error.
    #[error("PDF text extraction failed: {detail}")]
    Extraction { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_names_the_env_var() {
        let msg = AnalysisError::MissingApiKey.to_string();
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn no_file_matches_client_facing_wording() {
        assert_eq!(AnalysisError::NoFile.to_string(), "No file uploaded");
    }

    #[test]
    fn model_invocation_carries_detail() {
        let e = AnalysisError::ModelInvocation {
            detail: "HTTP 429: quota exceeded".into(),
        };
        assert!(e.to_string().contains("quota exceeded"));
    }

    #[test]
    fn extraction_carries_detail() {
        let e = AnalysisError::Extraction {
            detail: "no text layer".into(),
        };
        assert!(e.to_string().contains("no text layer"));
    }
}
