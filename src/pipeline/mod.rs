//! Pipeline stages for composing and transforming PDFs.
//!
//! Each submodule implements one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! HTML ──▶ render ──▶ metadata ──▶ PdfObject ──▶ transform ──▶ PdfObject
//!                                      ▲              │
//!                     input ───────────┘      substitute + typeset
//! ```
//!
//! 1. [`render`]: HTML to PDF bytes via an [`render::HtmlRenderer`], bounded
//!    by the render timeout
//! 2. [`input`]: validate a local path before it is read
//! 3. [`metadata`]: page count, first-page box and digest (lopdf, on the
//!    blocking pool)
//! 4. [`substitute`]: fill a LaTeX template with request values
//! 5. [`typeset`]: run the typesetting engine and capture its output
//! 6. [`transform`]: orchestrate 4 and 5 and measure the result

pub mod input;
pub mod metadata;
pub mod render;
pub mod substitute;
pub mod transform;
pub mod typeset;
