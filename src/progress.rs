//! Progress-callback trait for transformation state changes.
//!
//! Inject an [`Arc<dyn TransformProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to observe each
//! transformation as it moves through its states:
//!
//! ```text
//! Idle ──▶ TemplateGenerated ──▶ SubprocessRunning ──▶ Succeeded
//!   │              │                     │
//!   └──────────────┴─────────────────────┴──────────▶ Failed
//! ```
//!
//! `Idle` is the implicit starting state and is never reported.
//!
//! # Example
//!
//! ```rust
//! use pdfpress::{PipelineConfig, TransformKind, TransformProgressCallback, TransformState};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountSuccesses(AtomicUsize);
//!
//! impl TransformProgressCallback for CountSuccesses {
//!     fn on_state_change(&self, _kind: TransformKind, state: TransformState) {
//!         if state == TransformState::Succeeded {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(Arc::new(CountSuccesses(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::transform::TransformKind;
use std::fmt;
use std::sync::Arc;

/// Where a single transformation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformState {
    Idle,
    /// The working document has been written to the destination directory.
    TemplateGenerated,
    /// The typesetting engine has been spawned.
    SubprocessRunning,
    /// The output PDF was measured into a new object.
    Succeeded,
    Failed,
}

impl TransformState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransformState::Succeeded | TransformState::Failed)
    }
}

impl fmt::Display for TransformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransformState::Idle => "idle",
            TransformState::TemplateGenerated => "template-generated",
            TransformState::SubprocessRunning => "subprocess-running",
            TransformState::Succeeded => "succeeded",
            TransformState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Called by the orchestrator on every state transition.
///
/// Calls arrive in program order from whichever task drives the
/// transformation. Implementations must be `Send + Sync`.
pub trait TransformProgressCallback: Send + Sync {
    fn on_state_change(&self, kind: TransformKind, state: TransformState) {
        let _ = (kind, state);
    }
}

/// A no-op implementation for callers that need a concrete callback value.
///
/// Leaving [`crate::config::PipelineConfig::progress_callback`] as `None`
/// skips reporting entirely; it does not install this type.
pub struct NoopProgressCallback;

impl TransformProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn TransformProgressCallback>;
