//! Fallback text extraction for PDFs with a digital text layer.
//!
//! When the direct multimodal call fails (quota, content filter, a PDF
//! the model's document reader chokes on), the pipeline can still salvage
//! the request by pulling the embedded text layer and re-invoking the
//! model in text mode. This only works for digital PDFs — scanned-image
//! PDFs and uploaded images have no text layer and stay ineligible.
//!
//! The extractor sits behind [`TextExtractor`] so tests can script both
//! success and failure without crafting pathological PDFs.

use crate::error::AnalysisError;

/// "Given binary PDF, return plain text" — the narrow extraction capability.
pub trait TextExtractor: Send + Sync {
    /// Pull the text layer from the document bytes.
    ///
    /// Fails with [`AnalysisError::Extraction`] when the binary cannot be
    /// parsed or carries no usable text.
    fn extract_text(&self, bytes: &[u8]) -> Result<String, AnalysisError>;
}

/// Whether the fallback branch applies to this media type.
///
/// Restricted to PDF: image uploads have no text layer to pull, so a
/// failed direct call on an image propagates immediately.
pub fn is_extraction_eligible(media_type: &str) -> bool {
    media_type == "application/pdf"
}

/// PDF text extractor backed by the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, AnalysisError> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            AnalysisError::Extraction {
                detail: e.to_string(),
            }
        })?;

        // A parseable PDF with a blank text layer (scanned pages) is as
        // useless to the text-mode prompt as a corrupt one.
        if text.trim().is_empty() {
            return Err(AnalysisError::Extraction {
                detail: "document has no text layer (scanned or image-only PDF)".into(),
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a valid PDF with text using lopdf (the library that
    /// pdf-extract uses internally).
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_stream = Stream::new(dictionary! {}, content.into_bytes());
        let content_id = doc.add_object(content_stream);

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(page) = doc.get_object_mut(page_id) {
            if let Object::Dictionary(ref mut dict) = page {
                dict.set("Parent", pages_id);
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn eligibility_is_pdf_only() {
        assert!(is_extraction_eligible("application/pdf"));
        assert!(!is_extraction_eligible("image/png"));
        assert!(!is_extraction_eligible("image/jpeg"));
        assert!(!is_extraction_eligible(""));
    }

    #[test]
    fn extracts_text_from_digital_pdf() {
        let pdf_bytes = make_test_pdf("Hemoglobin 14.2 g/dL");
        let text = PdfTextExtractor.extract_text(&pdf_bytes).unwrap();
        assert!(
            text.contains("Hemoglobin") || text.contains("14.2"),
            "expected report text, got: {text}"
        );
    }

    #[test]
    fn invalid_pdf_returns_extraction_error() {
        let result = PdfTextExtractor.extract_text(b"not a pdf");
        assert!(matches!(result, Err(AnalysisError::Extraction { .. })));
    }
}
