//! Wire types for the structured analysis result.
//!
//! These structs mirror the JSON schema the prompt instructs the model to
//! produce (see [`crate::prompts`]); serde derives keep the two in lockstep
//! through a single source of truth. Field names are the wire names — the
//! presentation layer consumes this JSON directly.
//!
//! ## Degrade-not-fail
//!
//! [`AnalysisOutcome`] is an explicit sum type so callers can distinguish a
//! fully parsed report from a degraded one programmatically rather than by
//! sniffing sentinel field values. The degraded variant always carries the
//! raw model text for operator debugging — it is never silently dropped.

use serde::{Deserialize, Serialize};

/// Whether a biomarker value falls inside, below, or above its reference
/// range, as judged by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiomarkerStatus {
    Normal,
    Low,
    High,
}

/// One measured health indicator extracted from the report.
///
/// `value` is kept as a string: lab reports contain values like `"<0.01"`
/// or `"negative"` that are numeric-looking at best. The pipeline does not
/// coerce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerResult {
    /// Biomarker name, e.g. "Hemoglobin".
    pub name: String,
    /// Measured value as printed on the report.
    pub value: String,
    /// Unit of measurement; may be empty for dimensionless markers.
    pub unit: String,
    /// Position relative to the reference range.
    pub status: BiomarkerStatus,
    /// Reference range as free text, e.g. "13.2-16.6".
    pub range: String,
    /// One-sentence health insight from the model.
    pub insight: String,
    /// Display grouping label. Models occasionally omit it; "Other" keeps
    /// the result renderable instead of failing the whole decode.
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "Other".to_string()
}

/// The full structured analysis of one report.
///
/// `results` preserves the model's extraction order — the presentation
/// layer groups by category itself. `score` and `critical_items` are
/// accepted as-is; this layer does not clamp the expected 0–100 domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Executive summary, typically 2–3 sentences.
    pub summary: String,
    /// Health score, expected domain 0–100.
    pub score: i64,
    /// Count of findings needing attention.
    pub critical_items: i64,
    /// Extracted biomarkers in model order.
    pub results: Vec<BiomarkerResult>,
}

/// Summary text of the sentinel report returned when the model's output
/// cannot be decoded.
pub const SENTINEL_SUMMARY: &str = "Unable to parse the blood report. Please ensure the file is \
a valid blood test report with clear biomarker data.";

impl AnalysisReport {
    /// The fixed sentinel report: well-formed but semantically empty.
    pub fn sentinel() -> Self {
        Self {
            summary: SENTINEL_SUMMARY.to_string(),
            score: 0,
            critical_items: 0,
            results: Vec::new(),
        }
    }
}

/// Outcome of parsing the model's raw text.
///
/// Both variants are a success at the pipeline level: once the model has
/// answered, the caller never sees a hard failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The raw text decoded cleanly into the schema.
    Complete(AnalysisReport),
    /// Decoding failed; `report` is the sentinel and `raw_response` the
    /// unparsed model output, surfaced to the caller for diagnosis.
    Degraded {
        report: AnalysisReport,
        raw_response: String,
    },
}

impl AnalysisOutcome {
    /// The report regardless of variant.
    pub fn report(&self) -> &AnalysisReport {
        match self {
            AnalysisOutcome::Complete(report) => report,
            AnalysisOutcome::Degraded { report, .. } => report,
        }
    }

    /// True when decoding fell back to the sentinel.
    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serialises_lowercase() {
        assert_eq!(
            serde_json::to_string(&BiomarkerStatus::Normal).unwrap(),
            "\"normal\""
        );
        assert_eq!(
            serde_json::from_str::<BiomarkerStatus>("\"high\"").unwrap(),
            BiomarkerStatus::High
        );
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        assert!(serde_json::from_str::<BiomarkerStatus>("\"elevated\"").is_err());
    }

    #[test]
    fn category_defaults_to_other() {
        let json = r#"{"name":"TSH","value":"2.1","unit":"mIU/L","status":"normal",
                       "range":"0.4-4.0","insight":"Thyroid function is normal."}"#;
        let b: BiomarkerResult = serde_json::from_str(json).unwrap();
        assert_eq!(b.category, "Other");
    }

    #[test]
    fn sentinel_is_empty_and_zeroed() {
        let s = AnalysisReport::sentinel();
        assert!(s.results.is_empty());
        assert_eq!(s.score, 0);
        assert_eq!(s.critical_items, 0);
        assert_eq!(s.summary, SENTINEL_SUMMARY);
    }

    #[test]
    fn outcome_accessors() {
        let complete = AnalysisOutcome::Complete(AnalysisReport::sentinel());
        assert!(!complete.is_degraded());

        let degraded = AnalysisOutcome::Degraded {
            report: AnalysisReport::sentinel(),
            raw_response: "gibberish".into(),
        };
        assert!(degraded.is_degraded());
        assert_eq!(degraded.report().score, 0);
    }
}
