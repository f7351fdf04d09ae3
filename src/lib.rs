//! # labsight
//!
//! Turn an uploaded medical report (PDF or image) into a structured,
//! typed biomarker analysis using the Gemini API.
//!
//! ## Why this crate?
//!
//! Lab reports arrive as PDFs and phone photos; generative models can read
//! them but answer in free text that drifts from any schema you ask for.
//! This crate is the reliability layer in between: it drives the model
//! call, falls back from native document understanding to plain-text
//! extraction when the model rejects the binary, and validates the
//! response into a typed result — degrading to a well-formed sentinel
//! instead of failing once the expensive call has been made.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Upload
//!  │
//!  ├─ 1. Encode    bytes → base64 + media type (default application/pdf)
//!  ├─ 2. Prompt    fixed JSON-schema instruction (direct or text variant)
//!  ├─ 3. Invoke    Gemini generateContent with the document attached
//!  │      └─ on failure, PDF only: pull the text layer, re-invoke in
//!  │         text mode; any fallback failure re-raises the original error
//!  └─ 4. Parse     strip code fences, decode the schema,
//!                  degrade to a sentinel + raw text when decoding fails
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use labsight::{AnalysisConfig, AnalysisPipeline, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from GEMINI_API_KEY at request time
//!     let pipeline = AnalysisPipeline::new(AnalysisConfig::default());
//!     let bytes = std::fs::read("report.pdf")?;
//!     let doc = UploadedDocument::new(bytes, Some("application/pdf"), "report.pdf");
//!     let analysis = pipeline.analyze(doc).await?;
//!     println!("score: {}", analysis.outcome.report().score);
//!     Ok(())
//! }
//! ```
//!
//! The HTTP surface ([`server::router`]) exposes the same pipeline as
//! `POST /api/analyze` (multipart form, one `file` field).
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `labsight` server binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library:
//! ```toml
//! labsight = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{Analysis, AnalysisPipeline};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::AnalysisError;
pub use pipeline::encode::UploadedDocument;
pub use pipeline::extract::{PdfTextExtractor, TextExtractor};
pub use pipeline::model::{GeminiClient, GenerativeModel, InvocationMode};
pub use report::{AnalysisOutcome, AnalysisReport, BiomarkerResult, BiomarkerStatus};
