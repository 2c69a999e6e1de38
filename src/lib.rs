//! # pdfpress
//!
//! Render HTML to PDF, then apply print-layout transformations (page
//! numbers, a trailing blank page, gutter margins) through a LaTeX engine.
//!
//! Every PDF is a [`PdfObject`]: its bytes, held in memory or in a file, plus
//! the metadata measured from them (page count, first-page size in points
//! and inches, SHA-1). Objects are immutable; each transformation produces a
//! new file-backed object in a destination directory.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTML
//!  │
//!  ├─ 1. Render     wkhtmltopdf-compatible engine, bounded by a timeout
//!  ├─ 2. Measure    lopdf parse (spawn_blocking) + SHA-1
//!  ├─ 3. Persist    write the buffer to disk (explicit)
//!  ├─ 4. Template   fill the LaTeX source for the transformation
//!  ├─ 5. Typeset    pdflatex-compatible engine writes <stem>-<suffix>.pdf
//!  └─ 6. Measure    the output becomes a new PdfObject
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfpress::{add_page_numbers, append_blank_page, render_to_file, PipelineConfig, RenderOverrides};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::from_env()?;
//!     let doc = render_to_file("<h1>Chapter 1</h1>", "out/chapter.pdf", &RenderOverrides::default(), &config).await?;
//!     let numbered = add_page_numbers(&doc, 1, 0, "out", &config).await?;
//!     let padded = append_blank_page(&numbered, "out", &config).await?;
//!     println!("{} pages, sha1 {}", padded.meta().page_count, padded.meta().sha1);
//!     Ok(())
//! }
//! ```
//!
//! ## External programs
//!
//! | Role | Default binary | Override |
//! |------|----------------|----------|
//! | HTML renderer | `wkhtmltopdf` | `PipelineConfig::renderer`, `renderer_path`, `PDFPRESS_RENDERER_PATH` |
//! | Typesetting engine | `pdflatex` | `PipelineConfig::typesetter_path`, `PDFPRESS_TYPESETTER_PATH` |
//!
//! The engine needs the `pdfpages`, `geometry` and `fancyhdr` packages.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod identity;
pub mod object;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod templates;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    InchPrecision, MarginOverrides, Margins, PipelineConfig, PipelineConfigBuilder, RenderOptions,
    RenderOverrides,
};
pub use convert::{
    add_gutter_margins, add_page_numbers, append_blank_page, apply_chain, load, render_sync,
    render_to_buffer, render_to_file, render_to_object, transform,
};
pub use error::PdfPressError;
pub use identity::content_hash;
pub use object::{PdfId, PdfInput, PdfObject, PdfSource};
pub use pipeline::metadata::{PageGeometry, PdfMeta};
pub use pipeline::render::{CommandRenderer, HtmlRenderer};
pub use pipeline::substitute::{PlaceholderEngine, TemplateEngine};
pub use pipeline::transform::{TransformKind, Transformation};
pub use progress::{NoopProgressCallback, ProgressCallback, TransformProgressCallback, TransformState};
pub use stream::{transform_stream, TransformStream};
