//! Error type for the pdfpress library.
//!
//! Every operation returns `Result<_, PdfPressError>`. Nothing is retried
//! inside the library and no partial artifact is cleaned up on failure: the
//! caller sees the first error and decides whether to redo the step with a
//! fresh destination.

use std::path::PathBuf;
use thiserror::Error;

use crate::object::PdfId;

/// All errors returned by the pdfpress library.
#[derive(Debug, Error)]
pub enum PdfPressError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The input is neither a usable file path nor a byte buffer.
    #[error("Invalid input '{input}': expected a PDF file path or a byte buffer")]
    InvalidInput { input: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The bytes do not parse as a PDF, have no pages, or the first page has
    /// no usable bounding box.
    #[error("Unreadable PDF: {detail}")]
    UnreadablePdf { detail: String },

    // ── Renderer errors ───────────────────────────────────────────────────
    /// The HTML renderer reported an error.
    #[error("HTML rendering failed: {message}")]
    Render { message: String },

    /// The HTML renderer did not finish within the configured timeout.
    #[error("HTML rendering timed out after {timeout_ms}ms\nRaise the `timeout` render option.")]
    RenderTimeout { timeout_ms: u64 },

    // ── Typesetting errors ────────────────────────────────────────────────
    /// A transformation was requested on a buffer-backed object.
    #[error("PDF {id} is held in memory; persist it to a file before transforming it")]
    UnsupportedSource { id: PdfId },

    /// The typesetting engine wrote to standard error.
    #[error("Typesetting engine reported an error:\n{stderr}")]
    Typesetting { stderr: String },

    /// The typesetting engine exited with a nonzero status.
    #[error("{program} command failed with exit code {code}")]
    TypesettingFailed { program: String, code: i32 },

    /// Template generation failed (unsafe value or unresolved placeholder).
    #[error("Template error: {0}")]
    Template(String),

    /// A transformation parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The external program could not be located.
    #[error("{0}")]
    EngineNotFound(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading or writing a file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfPressError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PdfPressError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<engine_locate::LocateError> for PdfPressError {
    fn from(e: engine_locate::LocateError) -> Self {
        PdfPressError::EngineNotFound(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typesetting_failed_display() {
        let e = PdfPressError::TypesettingFailed {
            program: "pdflatex".into(),
            code: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("pdflatex"), "got: {msg}");
        assert!(msg.contains("exit code 2"), "got: {msg}");
    }

    #[test]
    fn render_timeout_display() {
        let e = PdfPressError::RenderTimeout { timeout_ms: 120000 };
        assert!(e.to_string().contains("120000ms"));
    }

    #[test]
    fn typesetting_display_carries_stderr() {
        let e = PdfPressError::Typesetting {
            stderr: "! LaTeX Error: File `pdfpages.sty' not found.".into(),
        };
        assert!(e.to_string().contains("pdfpages.sty"));
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let e = PdfPressError::io(
            "/tmp/out.pdf",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(e.to_string().contains("/tmp/out.pdf"));
        assert!(e.source().is_some());
    }
}
