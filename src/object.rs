//! The `PdfObject` model: PDF content plus its derived metadata.
//!
//! Content is either held in memory or lives in a file, never both. Objects
//! are immutable; every operation that changes content (persisting,
//! transforming) returns a new object with a fresh [`PdfId`].

use crate::config::InchPrecision;
use crate::error::PdfPressError;
use crate::pipeline::input;
use crate::pipeline::metadata::{MetadataExtractor, PdfMeta};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier assigned when a [`PdfObject`] is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PdfId(u64);

impl PdfId {
    fn next() -> Self {
        PdfId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PdfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pdf-{}", self.0)
    }
}

/// Where the bytes of a [`PdfObject`] live.
#[derive(Clone, PartialEq, Eq)]
pub enum PdfSource {
    /// Held in memory.
    Buffer(Arc<[u8]>),
    /// Stored on disk at this path.
    File(PathBuf),
}

impl fmt::Debug for PdfSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfSource::Buffer(b) => write!(f, "Buffer(<{} bytes>)", b.len()),
            PdfSource::File(p) => f.debug_tuple("File").field(p).finish(),
        }
    }
}

/// Anything a [`PdfObject`] can be created from.
#[derive(Debug, Clone)]
pub enum PdfInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for PdfInput {
    fn from(p: PathBuf) -> Self {
        PdfInput::Path(p)
    }
}

impl From<&Path> for PdfInput {
    fn from(p: &Path) -> Self {
        PdfInput::Path(p.to_path_buf())
    }
}

impl From<&str> for PdfInput {
    fn from(p: &str) -> Self {
        PdfInput::Path(PathBuf::from(p))
    }
}

impl From<Vec<u8>> for PdfInput {
    fn from(b: Vec<u8>) -> Self {
        PdfInput::Bytes(b)
    }
}

impl From<&[u8]> for PdfInput {
    fn from(b: &[u8]) -> Self {
        PdfInput::Bytes(b.to_vec())
    }
}

/// A PDF and its metadata, the unit passed between pipeline stages.
#[derive(Debug, Clone)]
pub struct PdfObject {
    id: PdfId,
    source: PdfSource,
    meta: PdfMeta,
}

impl PdfObject {
    /// Measure an in-memory PDF.
    pub async fn from_buffer(
        bytes: impl Into<Arc<[u8]>>,
        precision: InchPrecision,
    ) -> Result<Self, PdfPressError> {
        let bytes: Arc<[u8]> = bytes.into();
        let meta = MetadataExtractor::new(precision)
            .extract(Arc::clone(&bytes))
            .await?;
        Ok(Self::assemble(PdfSource::Buffer(bytes), meta))
    }

    /// Read and measure a PDF file. The result keeps `path` as its source.
    pub async fn from_file(
        path: impl AsRef<Path>,
        precision: InchPrecision,
    ) -> Result<Self, PdfPressError> {
        let path = path.as_ref();
        let bytes: Arc<[u8]> = input::read_local(path).await?.into();
        let meta = MetadataExtractor::new(precision).extract(bytes).await?;
        Ok(Self::assemble(PdfSource::File(path.to_path_buf()), meta))
    }

    /// Dispatch on the kind of input. An empty path or empty buffer is
    /// rejected as [`PdfPressError::InvalidInput`].
    pub async fn from_input(
        input: impl Into<PdfInput>,
        precision: InchPrecision,
    ) -> Result<Self, PdfPressError> {
        match input.into() {
            PdfInput::Path(p) => Self::from_file(p, precision).await,
            PdfInput::Bytes(b) if b.is_empty() => Err(PdfPressError::InvalidInput {
                input: "<empty buffer>".into(),
            }),
            PdfInput::Bytes(b) => Self::from_buffer(b, precision).await,
        }
    }

    fn assemble(source: PdfSource, meta: PdfMeta) -> Self {
        let obj = Self {
            id: PdfId::next(),
            source,
            meta,
        };
        debug!("Created {} from {:?}", obj.id, obj.source);
        obj
    }

    /// Write this object's bytes to `path` and return a file-backed copy.
    ///
    /// Metadata is carried over as-is; the bytes are identical, so there is
    /// nothing to re-measure. Parent directories are created.
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<PdfObject, PdfPressError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PdfPressError::InvalidInput {
                input: String::new(),
            });
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PdfPressError::io(parent, e))?;
        }

        match &self.source {
            PdfSource::Buffer(bytes) => {
                tokio::fs::write(path, bytes)
                    .await
                    .map_err(|e| PdfPressError::io(path, e))?;
            }
            PdfSource::File(src) => {
                if same_file(src, path).await {
                    debug!("{} already lives at {}", self.id, path.display());
                } else {
                    tokio::fs::copy(src, path)
                        .await
                        .map_err(|e| PdfPressError::io(path, e))?;
                }
            }
        }

        info!(
            "Persisted {} ({} bytes) to {}",
            self.id,
            self.meta.size_bytes,
            path.display()
        );
        Ok(Self::assemble(
            PdfSource::File(path.to_path_buf()),
            self.meta.clone(),
        ))
    }

    /// The raw bytes, reading the file for file-backed objects.
    pub async fn bytes(&self) -> Result<Arc<[u8]>, PdfPressError> {
        match &self.source {
            PdfSource::Buffer(b) => Ok(Arc::clone(b)),
            PdfSource::File(p) => tokio::fs::read(p)
                .await
                .map(Arc::from)
                .map_err(|e| PdfPressError::io(p, e)),
        }
    }

    pub fn id(&self) -> PdfId {
        self.id
    }

    pub fn source(&self) -> &PdfSource {
        &self.source
    }

    pub fn meta(&self) -> &PdfMeta {
        &self.meta
    }

    /// The backing file, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match &self.source {
            PdfSource::File(p) => Some(p),
            PdfSource::Buffer(_) => None,
        }
    }

    /// The in-memory bytes, if any.
    pub fn buffer(&self) -> Option<&[u8]> {
        match &self.source {
            PdfSource::Buffer(b) => Some(b),
            PdfSource::File(_) => None,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.source, PdfSource::File(_))
    }
}

/// Whether `a` and `b` name the same existing file, whatever their spelling.
///
/// Copying a file onto itself truncates it, so aliases (`..`, symlinks,
/// relative vs absolute) must be caught before a copy.
async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (
        tokio::fs::canonicalize(a).await,
        tokio::fs::canonicalize(b).await,
    ) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}
