//! Document encoding: uploaded bytes → base64 payload for the model API.
//!
//! Gemini accepts documents and images as base64 `inline_data` embedded in
//! the JSON request body. Uploads are bounded single documents, so a full
//! in-memory read and encode is acceptable — no streaming needed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// Media type assumed when the client did not declare one.
///
/// PDF is by far the dominant report format; a missing content-type on the
/// multipart field almost always means a scripted PDF upload.
pub const DEFAULT_MEDIA_TYPE: &str = "application/pdf";

/// An uploaded medical report, request-scoped and never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `application/pdf` or `image/png`.
    pub media_type: String,
    /// Original filename, kept for log lines only.
    pub filename: String,
}

impl UploadedDocument {
    /// Normalise an upload: absent or empty media type defaults to
    /// [`DEFAULT_MEDIA_TYPE`].
    pub fn new(bytes: Vec<u8>, media_type: Option<&str>, filename: impl Into<String>) -> Self {
        let media_type = match media_type {
            Some(mt) if !mt.is_empty() => mt.to_string(),
            _ => DEFAULT_MEDIA_TYPE.to_string(),
        };
        Self {
            bytes,
            media_type,
            filename: filename.into(),
        }
    }
}

/// Base64 transport encoding of an upload, ready for the `inline_data`
/// part of a multimodal request.
#[derive(Debug, Clone)]
pub struct EncodedDocument {
    /// Base64 (standard alphabet, padded) of the raw bytes.
    pub payload_b64: String,
    /// Media type carried alongside the payload.
    pub media_type: String,
}

/// Encode an uploaded document for the direct multimodal call.
pub fn encode(doc: &UploadedDocument) -> EncodedDocument {
    let payload_b64 = STANDARD.encode(&doc.bytes);
    debug!(
        filename = %doc.filename,
        media_type = %doc.media_type,
        raw_bytes = doc.bytes.len(),
        b64_bytes = payload_b64.len(),
        "Encoded upload for model request"
    );
    EncodedDocument {
        payload_b64,
        media_type: doc.media_type.clone(),
    }
}
