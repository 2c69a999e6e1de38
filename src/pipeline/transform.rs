//! Transformation orchestrator: template → typesetting engine → new object.
//!
//! A transformation never mutates its input. It writes a LaTeX working
//! document into the destination directory, runs the engine there, and
//! measures the PDF the engine produced as a brand-new [`PdfObject`].
//!
//! Nothing is retried and nothing is cleaned up on failure; the working
//! document and any partial engine output stay in the destination for
//! inspection. Two transformations of the same kind into the same directory
//! overwrite each other's working document, so callers serialise them.

use crate::config::{round_to, PipelineConfig};
use crate::error::PdfPressError;
use crate::object::PdfObject;
use crate::pipeline::metadata::PageGeometry;
use crate::pipeline::substitute::{PlaceholderEngine, TemplateEngine};
use crate::pipeline::typeset::{program_name, run_engine};
use crate::progress::TransformState;
use crate::templates;
use engine_locate::{locate, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default gutter as a fraction of the page width.
const GUTTER_WIDTH_FRACTION: f64 = 0.04;
const GUTTER_MIN_IN: f64 = 0.125;
const GUTTER_MAX_IN: f64 = 0.75;

/// The kinds of layout change the engine can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    PageNumbering,
    BlankPage,
    GutterMargin,
}

impl TransformKind {
    /// Name of the working document written into the destination directory.
    pub fn working_file(self) -> &'static str {
        match self {
            TransformKind::PageNumbering => "page_numbering.tex",
            TransformKind::BlankPage => "blank_page.tex",
            TransformKind::GutterMargin => "gutter_margin.tex",
        }
    }

    /// Appended to the source file stem to name the output.
    pub fn job_suffix(self) -> &'static str {
        match self {
            TransformKind::PageNumbering => "paged",
            TransformKind::BlankPage => "blank",
            TransformKind::GutterMargin => "gutter",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            TransformKind::PageNumbering => templates::PAGE_NUMBERING,
            TransformKind::BlankPage => templates::BLANK_PAGE,
            TransformKind::GutterMargin => templates::GUTTER_MARGIN,
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransformKind::PageNumbering => "page numbering",
            TransformKind::BlankPage => "blank page",
            TransformKind::GutterMargin => "gutter margin",
        };
        f.write_str(s)
    }
}

/// A transformation as requested by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transformation {
    /// Print folios starting at `starting_page` (≥ 1).
    ///
    /// `pre_paged_pages` counts pages already numbered earlier in the book;
    /// its parity decides which footer corner is outside.
    PageNumbering {
        starting_page: u32,
        #[serde(default)]
        pre_paged_pages: u32,
    },
    /// Append one blank page of the source's size.
    BlankPage,
    /// Shift pages away from the binding edge by `gutter` inches, or by a
    /// width-derived default.
    GutterMargin {
        #[serde(default)]
        gutter: Option<f64>,
    },
}

impl Transformation {
    pub fn kind(&self) -> TransformKind {
        match self {
            Transformation::PageNumbering { .. } => TransformKind::PageNumbering,
            Transformation::BlankPage => TransformKind::BlankPage,
            Transformation::GutterMargin { .. } => TransformKind::GutterMargin,
        }
    }
}

/// Which fancyhdr corners carry the folio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterPlacement {
    /// `LE,RO`: outer corners when the section starts on an odd page.
    LeftEvenRightOdd,
    /// `LO,RE`
    LeftOddRightEven,
}

impl FooterPlacement {
    pub fn for_pre_paged(pre_paged_pages: u32) -> Self {
        if pre_paged_pages % 2 == 0 {
            FooterPlacement::LeftEvenRightOdd
        } else {
            FooterPlacement::LeftOddRightEven
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            FooterPlacement::LeftEvenRightOdd => "LE,RO",
            FooterPlacement::LeftOddRightEven => "LO,RE",
        }
    }
}

/// Default gutter for a page `width_pt` points wide, in inches.
pub fn default_gutter_inches(width_pt: f64) -> f64 {
    let inches = width_pt / crate::config::POINTS_PER_INCH * GUTTER_WIDTH_FRACTION;
    round_to(inches, 3).clamp(GUTTER_MIN_IN, GUTTER_MAX_IN)
}

/// Everything the template and engine need for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationRequest {
    pub kind: TransformKind,
    pub source_file: PathBuf,
    /// `<source stem>-<suffix>`
    pub job_name: String,
    pub geometry: PageGeometry,
    pub starting_page: Option<u32>,
    pub footer: Option<FooterPlacement>,
    /// Gutter length such as `"0.34in"`.
    pub gutter: Option<String>,
    pub left_margin: String,
    pub right_margin: String,
}

impl TransformationRequest {
    /// Validate `transformation` against `source`.
    ///
    /// Fails with [`PdfPressError::UnsupportedSource`] for buffer-backed
    /// sources and [`PdfPressError::InvalidParameter`] for out-of-range values.
    pub fn new(
        source: &PdfObject,
        transformation: &Transformation,
        config: &PipelineConfig,
    ) -> Result<Self, PdfPressError> {
        let source_file = source
            .file_path()
            .ok_or(PdfPressError::UnsupportedSource { id: source.id() })?
            .to_path_buf();
        let kind = transformation.kind();
        let job_name = format!("{}-{}", job_stem(&source_file)?, kind.job_suffix());
        let geometry = source.meta().geometry();

        let mut request = Self {
            kind,
            source_file,
            job_name,
            geometry,
            starting_page: None,
            footer: None,
            gutter: None,
            left_margin: config.render.margins.left.clone(),
            right_margin: config.render.margins.right.clone(),
        };

        match *transformation {
            Transformation::PageNumbering {
                starting_page,
                pre_paged_pages,
            } => {
                if starting_page == 0 {
                    return Err(PdfPressError::InvalidParameter(
                        "starting page must be at least 1".into(),
                    ));
                }
                request.starting_page = Some(starting_page);
                request.footer = Some(FooterPlacement::for_pre_paged(pre_paged_pages));
            }
            Transformation::BlankPage => {}
            Transformation::GutterMargin { gutter } => {
                let inches = match gutter {
                    Some(g) => {
                        let rounded = round_to(g, 3);
                        if !rounded.is_finite() || rounded <= 0.0 {
                            return Err(PdfPressError::InvalidParameter(format!(
                                "gutter must be at least 0.001 inches, got {g}"
                            )));
                        }
                        rounded
                    }
                    None => default_gutter_inches(request.geometry.width),
                };
                request.gutter = Some(format!("{inches}in"));
            }
        }
        Ok(request)
    }

    /// Placeholder values for this request's template.
    ///
    /// The engine must find the source under exactly this name, so a path
    /// that is not valid UTF-8 is refused rather than approximated.
    pub fn values(&self) -> Result<Vec<(&'static str, String)>, PdfPressError> {
        let pdf_path = self
            .source_file
            .to_str()
            .ok_or_else(|| PdfPressError::InvalidInput {
                input: self.source_file.display().to_string(),
            })?;
        let mut v = vec![
            ("PDF_PATH", pdf_path.to_string()),
            ("PDF_HEIGHT", self.geometry.height_in.clone()),
            ("PDF_WIDTH", self.geometry.width_in.clone()),
        ];
        if let Some(page) = self.starting_page {
            v.push(("STARTING_PAGE", page.to_string()));
        }
        if let Some(footer) = self.footer {
            v.push(("FOOTER_POSITIONS", footer.token().to_string()));
        }
        if let Some(ref gutter) = self.gutter {
            v.push(("GUTTER", gutter.clone()));
        }
        if self.kind == TransformKind::PageNumbering {
            v.push(("LEFT_MARGIN", self.left_margin.clone()));
            v.push(("RIGHT_MARGIN", self.right_margin.clone()));
        }
        Ok(v)
    }

    pub fn working_path(&self, destination: &Path) -> PathBuf {
        destination.join(self.kind.working_file())
    }

    pub fn output_path(&self, destination: &Path) -> PathBuf {
        destination.join(format!("{}.pdf", self.job_name))
    }
}

/// Basename without a trailing `.pdf` (any case).
fn job_stem(path: &Path) -> Result<String, PdfPressError> {
    let is_pdf = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    let stem = if is_pdf {
        path.file_stem()
    } else {
        path.file_name()
    };
    stem.map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PdfPressError::InvalidInput {
            input: path.display().to_string(),
        })
}

/// Run `transformation` on `source`, writing into `destination`.
pub async fn run_transformation(
    source: &PdfObject,
    transformation: &Transformation,
    destination: &Path,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    let kind = transformation.kind();
    let report = |state: TransformState| {
        if state.is_terminal() {
            debug!("{} on {} finished: {}", kind, source.id(), state);
        } else {
            debug!("{} on {}: {}", kind, source.id(), state);
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_state_change(kind, state);
        }
    };

    let result = drive(source, transformation, destination, config, &report).await;
    match &result {
        Ok(out) => {
            report(TransformState::Succeeded);
            info!(
                "{} produced {} ({} pages, sha1 {})",
                kind,
                out.id(),
                out.meta().page_count,
                out.meta().sha1
            );
        }
        Err(e) => {
            report(TransformState::Failed);
            warn!("{} on {} failed: {}", kind, source.id(), e);
        }
    }
    result
}

async fn drive(
    source: &PdfObject,
    transformation: &Transformation,
    destination: &Path,
    config: &PipelineConfig,
    report: &(dyn Fn(TransformState) + Sync),
) -> Result<PdfObject, PdfPressError> {
    let request = TransformationRequest::new(source, transformation, config)?;

    let values = request.values()?;
    let document = match config.template_engine {
        Some(ref engine) => engine.render(request.kind.template(), &values)?,
        None => PlaceholderEngine.render(request.kind.template(), &values)?,
    };

    let program = match config.typesetter_path {
        Some(ref p) => p.clone(),
        None => locate(Engine::Typesetter)?,
    };

    tokio::fs::create_dir_all(destination)
        .await
        .map_err(|e| PdfPressError::io(destination, e))?;
    let working = request.working_path(destination);
    tokio::fs::write(&working, &document)
        .await
        .map_err(|e| PdfPressError::io(&working, e))?;
    report(TransformState::TemplateGenerated);

    let start = Instant::now();
    report(TransformState::SubprocessRunning);
    let outcome = run_engine(&program, &request.job_name, destination, &working).await?;
    outcome.check(&program_name(&program))?;
    debug!(
        "{} finished {} in {}ms",
        program.display(),
        request.job_name,
        start.elapsed().as_millis()
    );

    PdfObject::from_file(request.output_path(destination), config.inch_precision).await
}
