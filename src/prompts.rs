//! Prompts instructing the model to extract biomarkers as JSON.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — the direct and text-fallback variants
//!    must instruct the *identical* output schema so the parser can treat
//!    both uniformly; sharing the rule and schema blocks makes divergence
//!    impossible.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without a
//!    real model call, so schema regressions are caught cheaply.
//!
//! The prompt forbids markdown wrapping, but nothing downstream assumes
//! the model obeys — [`crate::pipeline::parse`] strips fences regardless.

/// Extraction rules shared by both prompt variants.
const EXTRACTION_RULES: &str = r#"For each biomarker found, provide:
1. Biomarker name (e.g., "Hemoglobin", "Vitamin D", "Total Cholesterol")
2. Measured value (just the number)
3. Unit of measurement (e.g., "g/dL", "ng/mL", "mg/dL")
4. Status: "normal", "low", or "high" based on the reference range
5. Reference range from the report
6. A brief health insight (one sentence explaining what this result means)
7. Category (e.g., "Hormones", "Liver", "Lipids", "Blood Count", "Vitamins", "Other")

Also provide:
- A comprehensive executive summary (2-3 sentences) highlighting key findings
- A health score from 0-100 (100 being perfect health)
- Count of critical items that need attention"#;

/// The exact JSON shape the model must return, shared by both variants.
const RESPONSE_SCHEMA: &str = r#"Return your response in this EXACT JSON format (no markdown, just pure JSON):
{
  "summary": "text here",
  "score": 85,
  "critical_items": 2,
  "results": [
    {
      "name": "Hemoglobin",
      "value": "14.2",
      "unit": "g/dL",
      "status": "normal",
      "range": "13.2-16.6",
      "insight": "Optimal oxygen transport capacity.",
      "category": "Blood Count"
    }
  ]
}

IMPORTANT: Return ONLY the JSON, no additional text or markdown formatting."#;

/// Build the prompt for direct multimodal invocation: the document bytes
/// travel alongside this text as an attachment.
pub fn direct_prompt() -> String {
    format!(
        "You are a medical AI assistant analyzing blood test reports.\n\n\
         Analyze this blood test report and extract ALL biomarkers with their values.\n\n\
         {EXTRACTION_RULES}\n\n{RESPONSE_SCHEMA}"
    )
}

/// Build the prompt for the text-fallback invocation: the extracted plain
/// text is quoted inline since no attachment is sent.
pub fn text_fallback_prompt(extracted_text: &str) -> String {
    format!(
        "You are a medical AI assistant analyzing blood test reports.\n\n\
         Here is the text extracted from a blood test report:\n\
         \"\"\"\n{extracted_text}\n\"\"\"\n\n\
         Analyze this text and extract ALL biomarkers with their values.\n\n\
         {EXTRACTION_RULES}\n\n{RESPONSE_SCHEMA}"
    )
}
