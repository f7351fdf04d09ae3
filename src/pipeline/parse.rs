//! Response parsing: raw model text → structured [`AnalysisOutcome`].
//!
//! ## Why is cleanup necessary?
//!
//! The prompt says "Return ONLY the JSON, no markdown formatting" — and
//! models disobey anyway, wrapping the payload in ` ```json … ``` ` fences
//! (occasionally twice, when a safety rewrite re-wraps an already-fenced
//! draft). Stripping here rather than tightening the prompt keeps the
//! prompt focused on *what to extract* and makes the cleanup
//! deterministic and independently testable.
//!
//! ## Degrade, never raise
//!
//! Decode failure is not an error at this layer. By the time raw text
//! exists, the expensive model call has already been paid for; the parser
//! returns the sentinel report plus the raw text for operator debugging
//! instead of throwing the response away.

use crate::report::{AnalysisOutcome, AnalysisReport};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Outer code fence with an optional language tag, e.g. ```json … ```.
static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:[A-Za-z0-9]+)?\s*\n(.*)\n?```\s*$").unwrap());

/// Strip leading/trailing code-fence markers from the model's output.
///
/// Applied to a fixpoint, so text wrapped once or twice in fences yields
/// the same inner payload, and already-clean text is a no-op (idempotent).
pub fn strip_code_fences(input: &str) -> String {
    let mut current = input.trim().to_string();
    loop {
        let stripped = match RE_OUTER_FENCE.captures(&current) {
            Some(caps) => caps[1].trim().to_string(),
            None => break,
        };
        if stripped == current {
            break;
        }
        current = stripped;
    }
    current
}

/// Decode the model's raw text into an [`AnalysisOutcome`].
///
/// Pure and deterministic: identical input always yields an identical
/// outcome. Malformed JSON, missing required fields, and out-of-enum
/// status values all take the degraded path — the caller still gets a
/// well-formed response carrying the raw text.
pub fn parse(raw: &str) -> AnalysisOutcome {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<AnalysisReport>(&cleaned) {
        Ok(report) => AnalysisOutcome::Complete(report),
        Err(e) => {
            warn!(
                error = %e,
                response_chars = raw.len(),
                "Model response did not match the analysis schema; returning sentinel"
            );
            AnalysisOutcome::Degraded {
                report: AnalysisReport::sentinel(),
                raw_response: raw.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{BiomarkerStatus, SENTINEL_SUMMARY};

    const CLEAN_JSON: &str = r#"{
        "summary": "Overall healthy panel with one low marker.",
        "score": 88,
        "critical_items": 1,
        "results": [
            {"name": "Hemoglobin", "value": "14.2", "unit": "g/dL",
             "status": "normal", "range": "13.2-16.6",
             "insight": "Optimal oxygen transport capacity.",
             "category": "Blood Count"},
            {"name": "Vitamin D", "value": "18", "unit": "ng/mL",
             "status": "low", "range": "30-100",
             "insight": "Below optimal; consider supplementation.",
             "category": "Vitamins"}
        ]
    }"#;

    #[test]
    fn strip_is_noop_on_clean_text() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn strip_single_fence_with_tag() {
        let wrapped = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(wrapped), "{\"a\": 1}");
    }

    #[test]
    fn strip_single_fence_without_tag() {
        let wrapped = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(wrapped), "{\"a\": 1}");
    }

    #[test]
    fn strip_double_fence_matches_single() {
        let once = "```json\n{\"a\": 1}\n```";
        let twice = "```\n```json\n{\"a\": 1}\n```\n```";
        assert_eq!(strip_code_fences(once), strip_code_fences(twice));
    }

    #[test]
    fn strip_is_idempotent() {
        let wrapped = "```json\n{\"a\": 1}\n```";
        let stripped = strip_code_fences(wrapped);
        assert_eq!(strip_code_fences(&stripped), stripped);
    }

    #[test]
    fn inner_fences_survive() {
        // A fence inside the payload (e.g. in an insight string) is content,
        // not wrapping, once the outer fence is gone.
        let input = "```json\n{\"summary\": \"use ``` carefully\"}\n```";
        let stripped = strip_code_fences(input);
        assert!(stripped.contains("use ``` carefully"));
    }

    #[test]
    fn parses_clean_schema_json() {
        let outcome = parse(CLEAN_JSON);
        let AnalysisOutcome::Complete(report) = outcome else {
            panic!("expected Complete, got {outcome:?}");
        };
        assert_eq!(report.score, 88);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[1].status, BiomarkerStatus::Low);
    }

    #[test]
    fn fenced_json_parses_identically() {
        let fenced = format!("```json\n{CLEAN_JSON}\n```");
        assert_eq!(parse(&fenced), parse(CLEAN_JSON));
    }

    #[test]
    fn parse_is_deterministic() {
        assert_eq!(parse(CLEAN_JSON), parse(CLEAN_JSON));
    }

    #[test]
    fn malformed_json_degrades_with_raw_text() {
        let raw = "I'm sorry, I cannot analyze this document.";
        let outcome = parse(raw);
        let AnalysisOutcome::Degraded {
            report,
            raw_response,
        } = outcome
        else {
            panic!("expected Degraded");
        };
        assert_eq!(report.summary, SENTINEL_SUMMARY);
        assert_eq!(report.score, 0);
        assert_eq!(report.critical_items, 0);
        assert!(report.results.is_empty());
        assert_eq!(raw_response, raw);
    }

    #[test]
    fn missing_required_field_degrades() {
        // `score` absent → strict decode fails, sentinel path taken.
        let raw = r#"{"summary": "x", "critical_items": 0, "results": []}"#;
        assert!(parse(raw).is_degraded());
    }

    #[test]
    fn unknown_status_value_degrades() {
        let raw = r#"{"summary":"x","score":50,"critical_items":0,
            "results":[{"name":"TSH","value":"2","unit":"mIU/L",
                        "status":"elevated","range":"","insight":""}]}"#;
        assert!(parse(raw).is_degraded());
    }
}
