//! Configuration types for a semester-assistant session.
//!
//! Everything a session needs besides the credential lives in
//! [`AssistantConfig`], built via [`AssistantConfigBuilder`]. Export layout
//! knobs are grouped in the nested [`ExportConfig`] so a front-end can hand
//! them to [`crate::output::ExportArtifact::render`] on their own.
//!
//! The credential is deliberately *not* part of the config: it is handed to
//! the completion client once, when the session is constructed.

use crate::error::AssistantError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration for a semester-assistant session.
///
/// # Example
/// ```rust
/// use semester_assistant::AssistantConfig;
///
/// let config = AssistantConfig::builder()
///     .model("gemini-1.5-pro")
///     .temperature(0.4)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "gemini-1.5-pro");
/// ```
#[derive(Clone)]
pub struct AssistantConfig {
    /// Generation model identifier. Default: `gemini-1.5-flash`.
    pub model: String,

    /// Base URL of the generation REST API, without a trailing slash.
    ///
    /// Overridable for regional endpoints and proxies.
    pub base_url: String,

    /// Sampling temperature. Default: 0.7.
    ///
    /// Quizzes and assignment briefs are creative output, so the default sits
    /// well above the near-zero values used for transcription work.
    pub temperature: f32,

    /// Maximum tokens the model may generate per operation. Default: 2048.
    pub max_output_tokens: u32,

    /// Timeout for downloading a URL input, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Layout and encoding of PDF exports.
    pub export: ExportConfig,

    /// Optional busy-indicator callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            download_timeout_secs: 120,
            export: ExportConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("export", &self.export)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SessionProgressCallback>"),
            )
            .finish()
    }
}

impl AssistantConfig {
    /// Create a new builder for `AssistantConfig`.
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AssistantConfig`].
#[derive(Debug)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
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

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn export(mut self, export: ExportConfig) -> Self {
        self.config.export = export;
        self
    }

    pub fn encoding(mut self, policy: EncodingPolicy) -> Self {
        self.config.export.encoding = policy;
        self
    }

    pub fn paper(mut self, paper: PaperSize) -> Self {
        self.config.export.paper = paper;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AssistantConfig, AssistantError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AssistantError::InvalidConfig("model must not be empty".into()));
        }
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(AssistantError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                c.base_url
            )));
        }
        if c.max_output_tokens == 0 {
            return Err(AssistantError::InvalidConfig(
                "max output tokens must be ≥ 1".into(),
            ));
        }
        c.export.validate()?;
        Ok(self.config)
    }
}

// ── Export layout ────────────────────────────────────────────────────────

/// Layout of the PDF export.
///
/// Units follow the classic single-column report layout: margins and cell
/// height in millimetres, font size in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Page size. Default: A4.
    pub paper: PaperSize,

    /// Courier size in points. Default: 12.
    pub font_size_pt: f32,

    /// Height of one line cell in millimetres. Default: 10.
    pub line_height_mm: f32,

    /// Left, right and top margin in millimetres. Default: 10.
    pub margin_mm: f32,

    /// Bottom margin that triggers a page break, in millimetres. Default: 15.
    pub bottom_margin_mm: f32,

    /// What to do with characters the export font cannot encode.
    pub encoding: EncodingPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            font_size_pt: 12.0,
            line_height_mm: 10.0,
            margin_mm: 10.0,
            bottom_margin_mm: 15.0,
            encoding: EncodingPolicy::default(),
        }
    }
}

impl ExportConfig {
    /// Reject layouts that leave no room for a single line.
    pub fn validate(&self) -> Result<(), AssistantError> {
        if self.font_size_pt <= 0.0 || self.line_height_mm <= 0.0 {
            return Err(AssistantError::InvalidConfig(
                "font size and line height must be positive".into(),
            ));
        }
        let (w, h) = self.paper.size_mm();
        if self.margin_mm < 0.0 || self.bottom_margin_mm < 0.0 {
            return Err(AssistantError::InvalidConfig("margins must not be negative".into()));
        }
        if w - 2.0 * self.margin_mm <= 0.0 {
            return Err(AssistantError::InvalidConfig(
                "horizontal margins exceed the page width".into(),
            ));
        }
        if h - self.margin_mm - self.bottom_margin_mm < self.line_height_mm {
            return Err(AssistantError::InvalidConfig(
                "vertical margins leave no room for a line".into(),
            ));
        }
        Ok(())
    }
}

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    /// 210 × 297 mm (default).
    #[default]
    A4,
    /// 215.9 × 279.4 mm.
    Letter,
}

impl PaperSize {
    /// Width and height in millimetres.
    pub fn size_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
        }
    }
}

/// Policy for characters outside the export font's Latin-1 repertoire.
///
/// | Policy | Typographic punctuation | Anything else unsupported |
/// |--------|-------------------------|---------------------------|
/// | `Strict` | rejected | rejected |
/// | `Transliterate` | mapped to ASCII/Latin-1 | rejected (default) |
/// | `Replace` | mapped to ASCII/Latin-1 | replaced with `?` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingPolicy {
    Strict,
    #[default]
    Transliterate,
    Replace,
}
