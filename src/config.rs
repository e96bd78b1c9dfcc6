//! Configuration types for slide description.
//!
//! All run behaviour is controlled through [`DescribeConfig`], built via its
//! [`DescribeConfigBuilder`]. One struct means one place to look when two
//! runs produce different documents.

use crate::error::Ppt2DescError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model requested from OpenAI when it is picked up from `OPENAI_API_KEY`
/// and no model is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Configuration for describing one deck or a directory of decks.
///
/// # Example
/// ```rust
/// use ppt2desc::DescribeConfig;
///
/// let config = DescribeConfig::builder()
///     .model("gemini-2.0-flash")
///     .provider_name("gemini")
///     .rate_limit(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.rate_limit, 30);
/// ```
#[derive(Clone)]
pub struct DescribeConfig {
    /// Model identifier, e.g. "gpt-4.1-nano", "gemini-2.0-flash".
    /// If None, the resolved provider's own default model is used. Deck
    /// documents record the model the provider actually calls.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "gemini", "vertexai").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Path to the LibreOffice (`soffice`) executable.
    /// If None, it is looked up on `PATH` and in the usual install locations.
    pub converter_path: Option<PathBuf>,

    /// Generation calls allowed per minute. Default: 60. Zero disables pacing.
    pub rate_limit: u32,

    /// Whether the rate limiter spans the batch or restarts for each deck.
    pub rate_limit_scope: RateLimitScope,

    /// Width of the normalised slide canvas in pixels. Default: 1920.
    pub canvas_width: u32,

    /// Height of the normalised slide canvas in pixels. Default: 1080.
    pub canvas_height: u32,

    /// RGB fill for the letterbox bars around a slide. Default: white.
    pub background: [u8; 3],

    /// Base prompt template file. If None, uses the built-in template.
    pub prompt_path: Option<PathBuf>,

    /// Extra instructions appended to the base prompt.
    pub instructions: Option<String>,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens generated per slide. Default: 4096.
    pub max_tokens: usize,

    /// Per-slide generation timeout in seconds. Default: 60.
    ///
    /// A timed-out slide is recorded with the error sentinel; it is not retried.
    pub api_timeout_secs: u64,

    /// Explicit pdfium shared library. If None, `PDFIUM_LIB_PATH` and then the
    /// system library are tried.
    pub pdfium_library: Option<PathBuf>,

    /// Receives deck and slide events as the batch runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            converter_path: None,
            rate_limit: 60,
            rate_limit_scope: RateLimitScope::default(),
            canvas_width: 1920,
            canvas_height: 1080,
            background: [255, 255, 255],
            prompt_path: None,
            instructions: None,
            temperature: 0.1,
            max_tokens: 4096,
            api_timeout_secs: 60,
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DescribeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescribeConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("converter_path", &self.converter_path)
            .field("rate_limit", &self.rate_limit)
            .field("rate_limit_scope", &self.rate_limit_scope)
            .field("canvas", &format_args!("{}x{}", self.canvas_width, self.canvas_height))
            .field("prompt_path", &self.prompt_path)
            .field("instructions", &self.instructions)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl DescribeConfig {
    /// Create a new builder for `DescribeConfig`.
    pub fn builder() -> DescribeConfigBuilder {
        DescribeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DescribeConfig`].
pub struct DescribeConfigBuilder {
    config: DescribeConfig,
}

impl DescribeConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn converter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.converter_path = Some(path.into());
        self
    }

    pub fn rate_limit(mut self, calls_per_minute: u32) -> Self {
        self.config.rate_limit = calls_per_minute;
        self
    }

    pub fn rate_limit_scope(mut self, scope: RateLimitScope) -> Self {
        self.config.rate_limit_scope = scope;
        self
    }

    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.config.canvas_width = width.max(16);
        self.config.canvas_height = height.max(16);
        self
    }

    pub fn background(mut self, rgb: [u8; 3]) -> Self {
        self.config.background = rgb;
        self
    }

    pub fn prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.prompt_path = Some(path.into());
        self
    }

    pub fn instructions(mut self, text: impl Into<String>) -> Self {
        self.config.instructions = Some(text.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DescribeConfig, Ppt2DescError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(Ppt2DescError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(Ppt2DescError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if matches!(c.model.as_deref(), Some(m) if m.trim().is_empty()) {
            return Err(Ppt2DescError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Lifetime of the rate limiter's last-call timestamp.
///
/// `Batch` honours a true global API budget: the first slide of deck two
/// still waits for the last slide of deck one. `PerDeck` starts every deck
/// with a fresh limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateLimitScope {
    /// One limiter shared by every deck in the batch. (default)
    #[default]
    Batch,
    /// A new limiter for each deck.
    PerDeck,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DescribeConfig::default();
        assert_eq!(c.rate_limit, 60);
        assert_eq!((c.canvas_width, c.canvas_height), (1920, 1080));
        assert_eq!(c.background, [255, 255, 255]);
        assert_eq!(c.rate_limit_scope, RateLimitScope::Batch);
        assert_eq!(c.model, None);
    }

    #[test]
    fn builder_clamps() {
        let c = DescribeConfig::builder()
            .canvas(4, 0)
            .temperature(5.0)
            .build()
            .unwrap();
        assert_eq!((c.canvas_width, c.canvas_height), (16, 16));
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_empty_model() {
        let err = DescribeConfig::builder().model("  ").build().unwrap_err();
        assert!(err.to_string().contains("model"));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        assert!(DescribeConfig::builder().api_timeout_secs(0).build().is_err());
    }

    #[test]
    fn zero_rate_limit_is_valid() {
        let c = DescribeConfig::builder().rate_limit(0).build().unwrap();
        assert_eq!(c.rate_limit, 0);
    }

    #[test]
    fn builder_sets_model() {
        let c = DescribeConfig::builder().model("gemini-1.5-pro").build().unwrap();
        assert_eq!(c.model.as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn scope_serialises_kebab_case() {
        let s = serde_json::to_string(&RateLimitScope::PerDeck).unwrap();
        assert_eq!(s, "\"per-deck\"");
    }
}
