//! Eager entry points: render HTML, load PDFs, apply transformations.
//!
//! Every function takes the [`PipelineConfig`] explicitly and returns after
//! its work is done. Use [`crate::stream::transform_stream`] instead when
//! you want each intermediate result of a chain as soon as it exists.

use crate::config::{PipelineConfig, RenderOverrides};
use crate::error::PdfPressError;
use crate::object::{PdfInput, PdfObject};
use crate::pipeline::render::render_html;
use crate::pipeline::transform::{run_transformation, Transformation};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Render `html` to PDF bytes.
///
/// `overrides` is merged field-by-field over `config.render`. A single
/// attempt is made, bounded by the merged timeout.
///
/// # Errors
/// - [`PdfPressError::Render`] when the renderer fails or returns nothing
/// - [`PdfPressError::RenderTimeout`] when it runs past the timeout
/// - [`PdfPressError::EngineNotFound`] when no renderer is configured or found
pub async fn render_to_buffer(
    html: &str,
    overrides: &RenderOverrides,
    config: &PipelineConfig,
) -> Result<Vec<u8>, PdfPressError> {
    render_html(html, overrides, config).await
}

/// Render `html` and measure the result into a buffer-backed [`PdfObject`].
pub async fn render_to_object(
    html: &str,
    overrides: &RenderOverrides,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    let bytes = render_html(html, overrides, config).await?;
    PdfObject::from_buffer(bytes, config.inch_precision).await
}

/// Render `html` and persist it to `path`, returning a file-backed object.
///
/// Parent directories are created.
pub async fn render_to_file(
    html: &str,
    path: impl AsRef<Path>,
    overrides: &RenderOverrides,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    render_to_object(html, overrides, config)
        .await?
        .persist(path)
        .await
}

/// Blocking version of [`render_to_object`].
///
/// Creates a new tokio runtime internally. Do not call from within an
/// existing async context (use [`render_to_object`] instead).
pub fn render_sync(
    html: &str,
    overrides: &RenderOverrides,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfPressError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(render_to_object(html, overrides, config))
}

/// Build a [`PdfObject`] from a file path or an in-memory buffer.
pub async fn load(
    input: impl Into<PdfInput>,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    PdfObject::from_input(input, config.inch_precision).await
}

/// Apply one transformation, writing into `destination`.
///
/// The source must be file-backed; persist a buffer-backed object first.
/// The result is a new object measured from the engine's output file.
pub async fn transform(
    source: &PdfObject,
    transformation: &Transformation,
    destination: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    run_transformation(source, transformation, destination.as_ref(), config).await
}

/// Print page numbers starting at `starting_page`.
///
/// `pre_paged_pages` is the count of pages numbered before this document;
/// when it is even, folios go in the `LE,RO` corners, otherwise `LO,RE`.
///
/// # Errors
/// [`PdfPressError::InvalidParameter`] when `starting_page` is 0, plus
/// everything [`transform`] can return.
pub async fn add_page_numbers(
    source: &PdfObject,
    starting_page: u32,
    pre_paged_pages: u32,
    destination: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    let t = Transformation::PageNumbering {
        starting_page,
        pre_paged_pages,
    };
    transform(source, &t, destination, config).await
}

/// Append one blank page with the source's dimensions.
pub async fn append_blank_page(
    source: &PdfObject,
    destination: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    transform(source, &Transformation::BlankPage, destination, config).await
}

/// Shift odd pages right and even pages left by `gutter` inches.
///
/// With `None` the gutter is 4 % of the page width, kept within
/// 0.125in to 0.75in.
pub async fn add_gutter_margins(
    source: &PdfObject,
    gutter: Option<f64>,
    destination: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    transform(
        source,
        &Transformation::GutterMargin { gutter },
        destination,
        config,
    )
    .await
}

/// Apply `steps` in order, each to the previous step's output.
///
/// An empty chain returns a clone of `source`. The first failure ends the
/// chain; earlier outputs stay on disk.
pub async fn apply_chain(
    source: &PdfObject,
    steps: &[Transformation],
    destination: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<PdfObject, PdfPressError> {
    let destination = destination.as_ref();
    let start = Instant::now();
    let mut current = source.clone();
    for step in steps {
        current = run_transformation(&current, step, destination, config).await?;
    }
    if !steps.is_empty() {
        info!(
            "Applied {} transformations to {} in {}ms",
            steps.len(),
            source.id(),
            start.elapsed().as_millis()
        );
    }
    Ok(current)
}
