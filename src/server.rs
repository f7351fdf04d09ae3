//! HTTP surface: the multipart analysis endpoint.
//!
//! One route does the work: `POST /api/analyze` takes a multipart form
//! with a single `file` field and answers with the analysis JSON. The
//! handler owns the outcome→HTTP mapping:
//!
//! | Pipeline result          | Status | Body                              |
//! |--------------------------|--------|-----------------------------------|
//! | `Complete`               | 200    | `AnalysisReport` JSON             |
//! | `Degraded`               | 200    | sentinel report + `rawResponse`   |
//! | `MissingApiKey`          | 500    | `{error}` (operator-fixable)      |
//! | `NoFile`                 | 400    | `{error}` (client resubmits)      |
//! | `ModelInvocation`        | 500    | `{error, details}`                |
//!
//! Requests share nothing but the `Arc<AnalysisPipeline>`; they run fully
//! in parallel, and a disconnected client simply drops the future —
//! nothing is persisted, so abandonment has no side effects.

use crate::analyze::AnalysisPipeline;
use crate::error::AnalysisError;
use crate::pipeline::encode::UploadedDocument;
use crate::report::{AnalysisOutcome, AnalysisReport};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// JSON error body for precondition failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Success body: the report, plus the raw model text on the degraded path.
#[derive(Debug, Serialize)]
struct AnalyzeBody {
    #[serde(flatten)]
    report: AnalysisReport,
    #[serde(rename = "rawResponse", skip_serializing_if = "Option::is_none")]
    raw_response: Option<String>,
}

/// Build the service router around a shared pipeline.
pub fn router(pipeline: Arc<AnalysisPipeline>) -> Router {
    let body_limit = pipeline.config().max_upload_bytes;
    Router::new()
        .route("/api/analyze", post(handle_analyze))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(pipeline)
}

async fn handle_analyze(
    State(pipeline): State<Arc<AnalysisPipeline>>,
    mut multipart: Multipart,
) -> Response {
    // Pull the single `file` field; anything else in the form is ignored.
    let mut upload: Option<UploadedDocument> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("report").to_string();
        let media_type = field.content_type().map(str::to_string);
        match field.bytes().await {
            Ok(bytes) => {
                upload = Some(UploadedDocument::new(
                    bytes.to_vec(),
                    media_type.as_deref(),
                    filename,
                ));
            }
            Err(e) => {
                warn!("Failed to read upload bytes: {e}");
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Failed to read file data".into(),
                    None,
                );
            }
        }
    }

    let Some(doc) = upload else {
        return analysis_error_response(AnalysisError::NoFile);
    };

    match pipeline.analyze(doc).await {
        Ok(analysis) => match analysis.outcome {
            AnalysisOutcome::Complete(report) => (
                StatusCode::OK,
                Json(AnalyzeBody {
                    report,
                    raw_response: None,
                }),
            )
                .into_response(),
            AnalysisOutcome::Degraded {
                report,
                raw_response,
            } => (
                StatusCode::OK,
                Json(AnalyzeBody {
                    report,
                    raw_response: Some(raw_response),
                }),
            )
                .into_response(),
        },
        Err(e) => analysis_error_response(e),
    }
}

/// Map a pipeline error to its HTTP shape.
fn analysis_error_response(err: AnalysisError) -> Response {
    match err {
        AnalysisError::NoFile => {
            error_response(StatusCode::BAD_REQUEST, err.to_string(), None)
        }
        AnalysisError::MissingApiKey => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
        }
        AnalysisError::ModelInvocation { detail } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process the file".into(),
            Some(detail),
        ),
        // Extraction never reaches the surface (superseded by the original
        // invocation error); the rest are internal misconfigurations.
        other => {
            warn!("Unexpected pipeline error at the HTTP boundary: {other}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process the file".into(),
                Some(other.to_string()),
            )
        }
    }
}

fn error_response(status: StatusCode, error: String, details: Option<String>) -> Response {
    (status, Json(ErrorBody { error, details })).into_response()
}
