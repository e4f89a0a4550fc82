//! Configuration for analysis and worksheet rendering.
//!
//! Every knob lives in [`WorksheetConfig`], built via its
//! [`WorksheetConfigBuilder`]. The model client is part of the config as an
//! explicitly constructed object (or the name of one to construct); nothing
//! is read from process-wide state except during provider auto-detection.

use crate::error::SagipError;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one analyse-and-render session.
///
/// # Example
/// ```rust
/// use sagip_worksheet::WorksheetConfig;
///
/// let config = WorksheetConfig::builder()
///     .model("gemini-2.5-flash")
///     .problem_count(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct WorksheetConfig {
    /// LLM model identifier, e.g. "gemini-2.5-flash", "gpt-4.1-mini".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "ollama").
    /// If None along with `provider`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature. Default: 0.4.
    ///
    /// Low enough to keep answers and answer key consistent, high enough
    /// that the five practice problems are not near-duplicates.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 4096.
    pub max_tokens: usize,

    /// Number of practice problems requested. Range: 1–20. Default: 5.
    pub problem_count: usize,

    /// Custom system prompt. If None, uses the built-in teacher persona.
    pub system_prompt: Option<String>,

    /// Longest photo edge in pixels before downscaling. Default: 2048.
    ///
    /// Phone photos are often 4000 px wide; vision models tile them down
    /// anyway, so sending more only costs upload time and tokens.
    pub max_image_dimension: u32,

    /// Per-call model timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for photo URLs in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Footer stamped on every worksheet page.
    pub footer: FooterStyle,

    /// Directory worksheets are saved into. Default: current directory.
    pub output_dir: PathBuf,
}

impl Default for WorksheetConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.4,
            max_tokens: 4096,
            problem_count: 5,
            system_prompt: None,
            max_image_dimension: 2048,
            api_timeout_secs: 120,
            download_timeout_secs: 60,
            footer: FooterStyle::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl fmt::Debug for WorksheetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorksheetConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("problem_count", &self.problem_count)
            .field("max_image_dimension", &self.max_image_dimension)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("footer", &self.footer)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl WorksheetConfig {
    pub fn builder() -> WorksheetConfigBuilder {
        WorksheetConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`WorksheetConfig`].
#[derive(Debug)]
pub struct WorksheetConfigBuilder {
    config: WorksheetConfig,
}

impl WorksheetConfigBuilder {
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

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn problem_count(mut self, n: usize) -> Self {
        self.config.problem_count = n.clamp(1, 20);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_image_dimension(mut self, px: u32) -> Self {
        self.config.max_image_dimension = px.clamp(256, 8192);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn footer(mut self, footer: FooterStyle) -> Self {
        self.config.footer = footer;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<WorksheetConfig, SagipError> {
        let c = &self.config;
        if c.max_tokens < 256 {
            return Err(SagipError::InvalidConfig(format!(
                "max_tokens must be ≥ 256 to fit a full worksheet, got {}",
                c.max_tokens
            )));
        }
        if c.api_timeout_secs == 0 {
            return Err(SagipError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if let FooterStyle::Tagline(ref t) = c.footer {
            if t.trim().is_empty() {
                return Err(SagipError::InvalidConfig(
                    "Footer tagline must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

/// What is stamped at the bottom of every worksheet page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FooterStyle {
    /// "Sagip - Page i of n" (default).
    #[default]
    PageNumbers,
    /// The same static line on every page.
    Tagline(String),
}

impl FooterStyle {
    /// Footer text for page `page` (1-indexed) of `total`.
    pub fn render(&self, page: usize, total: usize) -> String {
        match self {
            FooterStyle::PageNumbers => format!("Sagip - Page {page} of {total}"),
            FooterStyle::Tagline(t) => t.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = WorksheetConfig::default();
        assert_eq!(c.temperature, 0.4);
        assert_eq!(c.problem_count, 5);
        assert_eq!(c.footer, FooterStyle::PageNumbers);
    }

    #[test]
    fn builder_clamps() {
        let c = WorksheetConfig::builder()
            .problem_count(0)
            .temperature(5.0)
            .max_image_dimension(10)
            .build()
            .expect("valid");
        assert_eq!(c.problem_count, 1);
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.max_image_dimension, 256);
    }

    #[test]
    fn builder_rejects_tiny_max_tokens() {
        let err = WorksheetConfig::builder().max_tokens(10).build().unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn builder_rejects_blank_tagline() {
        let res = WorksheetConfig::builder()
            .footer(FooterStyle::Tagline("  ".into()))
            .build();
        assert!(res.is_err());
    }

    #[test]
    fn footer_render() {
        assert_eq!(FooterStyle::PageNumbers.render(2, 3), "Sagip - Page 2 of 3");
        assert_eq!(
            FooterStyle::Tagline("Bawat bata, mahalaga".into()).render(1, 9),
            "Bawat bata, mahalaga"
        );
    }
}
