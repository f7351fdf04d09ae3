//! Pipeline stages for report analysis.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different model backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! encode ──▶ model ──▶ parse
//! (base64)   (Gemini)  (fences + decode)
//!               │
//!               └─ on failure, PDF only: extract ──▶ model (text mode)
//! ```
//!
//! 1. [`encode`]  — base64-wrap the upload for the multimodal request body
//! 2. [`model`]   — drive the Gemini call; the only stage with network I/O
//! 3. [`extract`] — pull the PDF text layer when the direct call failed
//! 4. [`parse`]   — strip fence wrapping, decode the schema, degrade on
//!    failure instead of raising

pub mod encode;
pub mod extract;
pub mod model;
pub mod parse;
