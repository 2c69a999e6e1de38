//! Input resolution: validate a user-supplied path before reading it.
//!
//! Path problems (missing file, directory, no read permission) are reported
//! as such instead of surfacing later as a parse failure. Whether the bytes
//! are actually a PDF is left to [`crate::pipeline::metadata`].

use crate::error::PdfPressError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// The header must start within the first KiB (PDF 32000-1, 7.5.2).
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Validate that `path` names a readable regular file.
pub async fn resolve_local(path: &Path) -> Result<(), PdfPressError> {
    if path.as_os_str().is_empty() {
        return Err(PdfPressError::InvalidInput {
            input: String::new(),
        });
    }

    let meta = tokio::fs::metadata(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => PdfPressError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => PdfPressError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfPressError::io(path, e),
    })?;

    if !meta.is_file() {
        return Err(PdfPressError::InvalidInput {
            input: path.display().to_string(),
        });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(())
}

/// Validate `path` and read its full contents.
pub async fn read_local(path: &Path) -> Result<Vec<u8>, PdfPressError> {
    resolve_local(path).await?;
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => PdfPressError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfPressError::io(path, e),
    })
}

/// Whether `bytes` carry a `%PDF-` header near the start.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}
