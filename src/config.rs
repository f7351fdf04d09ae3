//! Configuration for the report-analysis pipeline.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share the config across the router state and to diff two
//! deployments to understand why their behaviour differs.
//!
//! The API key is deliberately *not* baked in at build time: it is
//! resolved on every request ([`AnalysisConfig::resolve_api_key`]) so an
//! operator can fix a missing credential without restarting the service.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable consulted when no key override is configured.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Configuration for report analysis.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use labsight::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gemini-2.0-flash")
///     .api_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Gemini model identifier. Default: `gemini-2.0-flash`.
    pub model: String,

    /// API key override. When `None`, the key is read from the environment
    /// variable named by `api_key_env` at request time.
    pub api_key: Option<String>,

    /// Name of the environment variable holding the API key.
    /// Default: `GEMINI_API_KEY`. Overridable so tests never depend on the
    /// real process environment.
    pub api_key_env: String,

    /// Per-model-call timeout in seconds. Default: 60.
    ///
    /// The model API offers no intrinsic bound; document-understanding
    /// calls routinely run for tens of seconds. This is the only long
    /// latency in the pipeline, so the ceiling lives here rather than on
    /// the whole request.
    pub api_timeout_secs: u64,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to what the report actually
    /// says — exactly what you want when transcribing lab values.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    ///
    /// A dense panel can list dozens of biomarkers; too low a cap silently
    /// truncates the JSON mid-array and forces the degraded path.
    pub max_output_tokens: u32,

    /// Maximum accepted upload size in bytes. Default: 55 MB
    /// (50 MB documents plus multipart overhead headroom).
    pub max_upload_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_key_env: API_KEY_ENV.to_string(),
            api_timeout_secs: 60,
            temperature: 0.1,
            max_output_tokens: 4096,
            max_upload_bytes: 55 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the API key, most-specific first:
    ///
    /// 1. `api_key` override set by the caller (tests, embedded use).
    /// 2. The `api_key_env` environment variable, read now — not at
    ///    startup — so a corrected environment takes effect immediately.
    ///
    /// Empty strings count as absent.
    pub fn resolve_api_key(&self) -> Result<String, AnalysisError> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(AnalysisError::MissingApiKey),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.config.api_key_env = var.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = n;
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, AnalysisError> {
        let c = &self.config;
        if c.model.is_empty() {
            return Err(AnalysisError::InvalidConfig(
                "Model identifier must not be empty".into(),
            ));
        }
        if c.max_output_tokens == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalysisConfig::default();
        assert_eq!(c.model, "gemini-2.0-flash");
        assert_eq!(c.api_timeout_secs, 60);
        assert_eq!(c.max_output_tokens, 4096);
        assert!(c.api_key.is_none());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AnalysisConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_empty_model() {
        let result = AnalysisConfig::builder().model("").build();
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn api_key_override_wins() {
        let c = AnalysisConfig::builder()
            .api_key("sk-test")
            .api_key_env("LABSIGHT_TEST_KEY_THAT_IS_NOT_SET")
            .build()
            .unwrap();
        assert_eq!(c.resolve_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn missing_key_is_a_hard_error() {
        let c = AnalysisConfig::builder()
            .api_key_env("LABSIGHT_TEST_KEY_THAT_IS_NOT_SET")
            .build()
            .unwrap();
        assert!(matches!(
            c.resolve_api_key(),
            Err(AnalysisError::MissingApiKey)
        ));
    }

    #[test]
    fn empty_override_falls_through_to_env() {
        let c = AnalysisConfig::builder()
            .api_key("")
            .api_key_env("LABSIGHT_TEST_KEY_THAT_IS_NOT_SET")
            .build()
            .unwrap();
        assert!(c.resolve_api_key().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = AnalysisConfig::builder().api_key("sk-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
