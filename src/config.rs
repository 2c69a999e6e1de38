//! Configuration types for rendering and transforming PDFs.
//!
//! There is no global options object. Process-wide defaults live in a
//! [`PipelineConfig`] value that callers build once and pass to every
//! operation; per-call render tweaks are a [`RenderOverrides`] merged
//! field-by-field over [`PipelineConfig::render`].

use crate::error::PdfPressError;
use crate::pipeline::render::HtmlRenderer;
use crate::pipeline::substitute::TemplateEngine;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Configuration shared by every pipeline operation.
///
/// Built via [`PipelineConfig::builder()`], [`PipelineConfig::from_env()`],
/// or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfpress::{InchPrecision, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .page_size("8.5in", "11in")
///     .margin("0.75in")
///     .render_timeout_ms(60_000)
///     .inch_precision(InchPrecision::Full)
///     .build()
///     .unwrap();
/// assert_eq!(config.render.margins.left, "0.75in");
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Default render options. Default: US Letter, 0.6in margins, 120 s timeout.
    pub render: RenderOptions,

    /// How inch strings in [`crate::PdfMeta`] are formatted. Default: 3 decimals.
    pub inch_precision: InchPrecision,

    /// Pre-constructed renderer. Takes precedence over `renderer_path`.
    pub renderer: Option<Arc<dyn HtmlRenderer>>,

    /// Path to a `wkhtmltopdf`-compatible binary.
    /// If None along with `renderer`, the binary is located at call time.
    pub renderer_path: Option<PathBuf>,

    /// Path to a `pdflatex`-compatible binary.
    /// If None, the binary is located at call time.
    pub typesetter_path: Option<PathBuf>,

    /// Template filler. If None, [`crate::pipeline::substitute::PlaceholderEngine`].
    pub template_engine: Option<Arc<dyn TemplateEngine>>,

    /// Observer for transformation state changes.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            inch_precision: InchPrecision::default(),
            renderer: None,
            renderer_path: None,
            typesetter_path: None,
            template_engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("render", &self.render)
            .field("inch_precision", &self.inch_precision)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn HtmlRenderer>"))
            .field("renderer_path", &self.renderer_path)
            .field("typesetter_path", &self.typesetter_path)
            .field(
                "template_engine",
                &self.template_engine.as_ref().map(|_| "<dyn TemplateEngine>"),
            )
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn TransformProgressCallback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults overlaid with `PDFPRESS_*` environment variables.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `PDFPRESS_PAGE_WIDTH` | default page width, e.g. `8.5in` |
    /// | `PDFPRESS_PAGE_HEIGHT` | default page height |
    /// | `PDFPRESS_MARGIN` | all four margins |
    /// | `PDFPRESS_RENDER_TIMEOUT_MS` | renderer timeout |
    /// | `PDFPRESS_INCH_PRECISION` | `full` or a decimal count |
    pub fn from_env() -> Result<Self, PdfPressError> {
        let mut builder = Self::builder();
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(w) = var("PDFPRESS_PAGE_WIDTH") {
            builder.config.render.page_width = w;
        }
        if let Some(h) = var("PDFPRESS_PAGE_HEIGHT") {
            builder.config.render.page_height = h;
        }
        if let Some(m) = var("PDFPRESS_MARGIN") {
            builder = builder.margin(m);
        }
        if let Some(t) = var("PDFPRESS_RENDER_TIMEOUT_MS") {
            let ms = t.trim().parse::<u64>().map_err(|_| {
                PdfPressError::InvalidConfig(format!(
                    "PDFPRESS_RENDER_TIMEOUT_MS must be an integer, got '{t}'"
                ))
            })?;
            builder = builder.render_timeout_ms(ms);
        }
        if let Some(p) = var("PDFPRESS_INCH_PRECISION") {
            builder = builder.inch_precision(p.parse()?);
        }

        builder.build()
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl fmt::Debug for PipelineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineConfigBuilder {
    pub fn page_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.config.render.page_width = width.into();
        self.config.render.page_height = height.into();
        self
    }

    /// Set all four margins to the same length.
    pub fn margin(mut self, margin: impl Into<String>) -> Self {
        self.config.render.margins = Margins::uniform(margin);
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.config.render.margins = margins;
        self
    }

    pub fn render_timeout_ms(mut self, ms: u64) -> Self {
        self.config.render.timeout_ms = ms;
        self
    }

    pub fn inch_precision(mut self, precision: InchPrecision) -> Self {
        self.config.inch_precision = precision;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn HtmlRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn renderer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.renderer_path = Some(path.into());
        self
    }

    pub fn typesetter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.typesetter_path = Some(path.into());
        self
    }

    pub fn template_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.config.template_engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PdfPressError> {
        let r = &self.config.render;
        if r.timeout_ms == 0 {
            return Err(PdfPressError::InvalidConfig(
                "Render timeout must be ≥ 1ms".into(),
            ));
        }
        for (name, value) in [
            ("page width", &r.page_width),
            ("page height", &r.page_height),
            ("top margin", &r.margins.top),
            ("right margin", &r.margins.right),
            ("bottom margin", &r.margins.bottom),
            ("left margin", &r.margins.left),
        ] {
            if value.trim().is_empty() {
                return Err(PdfPressError::InvalidConfig(format!("{name} is empty")));
            }
        }
        if let InchPrecision::Rounded { decimals } = self.config.inch_precision {
            if decimals > 9 {
                return Err(PdfPressError::InvalidConfig(format!(
                    "Inch precision must be 0–9 decimals, got {decimals}"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Render options ───────────────────────────────────────────────────────

/// Page margins as CSS lengths (`"0.6in"`, `"15mm"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
}

impl Margins {
    pub fn uniform(margin: impl Into<String>) -> Self {
        let m = margin.into();
        Self {
            top: m.clone(),
            right: m.clone(),
            bottom: m.clone(),
            left: m,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform("0.6in")
    }
}

/// Fully resolved options handed to an [`HtmlRenderer`].
///
/// Serialised with the renderer's key names: `height`, `width`,
/// `border.{top,right,bottom,left}`, `timeout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(rename = "height")]
    pub page_height: String,
    #[serde(rename = "width")]
    pub page_width: String,
    #[serde(rename = "border")]
    pub margins: Margins,
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_height: "11in".to_string(),
            page_width: "8.5in".to_string(),
            margins: Margins::default(),
            timeout_ms: 120_000,
        }
    }
}

impl RenderOptions {
    /// Overlay `overrides` on `self`; every field set in `overrides` wins.
    pub fn merged(&self, overrides: &RenderOverrides) -> RenderOptions {
        let pick = |o: &Option<String>, d: &String| o.clone().unwrap_or_else(|| d.clone());
        let m = &overrides.margins;
        RenderOptions {
            page_height: pick(&overrides.page_height, &self.page_height),
            page_width: pick(&overrides.page_width, &self.page_width),
            margins: Margins {
                top: pick(&m.top, &self.margins.top),
                right: pick(&m.right, &self.margins.right),
                bottom: pick(&m.bottom, &self.margins.bottom),
                left: pick(&m.left, &self.margins.left),
            },
            timeout_ms: overrides.timeout_ms.unwrap_or(self.timeout_ms),
        }
    }
}

/// Per-call render options; unset fields keep the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOverrides {
    #[serde(rename = "height", skip_serializing_if = "Option::is_none")]
    pub page_height: Option<String>,
    #[serde(rename = "width", skip_serializing_if = "Option::is_none")]
    pub page_width: Option<String>,
    #[serde(rename = "border")]
    pub margins: MarginOverrides,
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Optional per-side margin overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
}

impl RenderOverrides {
    /// Parse overrides from JSON such as `{"width": "10in", "border": {"top": "1in"}}`.
    pub fn from_json(json: &str) -> Result<Self, PdfPressError> {
        serde_json::from_str(json)
            .map_err(|e| PdfPressError::InvalidConfig(format!("render options: {e}")))
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.page_width = Some(width.into());
        self
    }

    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.page_height = Some(height.into());
        self
    }

    /// Override all four margins.
    pub fn margin(mut self, margin: impl Into<String>) -> Self {
        let m = margin.into();
        self.margins = MarginOverrides {
            top: Some(m.clone()),
            right: Some(m.clone()),
            bottom: Some(m.clone()),
            left: Some(m),
        };
        self
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Formatting policy for the `width_in` / `height_in` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InchPrecision {
    /// Round to `decimals` places, dropping trailing zeros (`8.5in`, `11in`).
    Rounded { decimals: u8 },
    /// Shortest exact representation of `points / 72`.
    Full,
}

impl Default for InchPrecision {
    fn default() -> Self {
        InchPrecision::Rounded { decimals: 3 }
    }
}

impl InchPrecision {
    /// Format a length in points as an inch string such as `"8.5in"`.
    pub fn format_points(self, points: f64) -> String {
        let inches = points / POINTS_PER_INCH;
        match self {
            InchPrecision::Full => format!("{inches}in"),
            InchPrecision::Rounded { decimals } => {
                format!("{}in", round_to(inches, decimals))
            }
        }
    }
}

impl std::str::FromStr for InchPrecision {
    type Err = PdfPressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("full") {
            return Ok(InchPrecision::Full);
        }
        s.parse::<u8>()
            .map(|decimals| InchPrecision::Rounded { decimals })
            .map_err(|_| {
                PdfPressError::InvalidConfig(format!(
                    "Inch precision must be 'full' or a decimal count, got '{s}'"
                ))
            })
    }
}

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    let rounded = (value * factor).round() / factor;
    // Avoid printing "-0".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
