//! Streaming chain API: emit each transformation's output as it completes.
//!
//! [`crate::convert::apply_chain`] only hands back the last object. A stream
//! lets callers publish or inspect intermediate PDFs (the numbered document
//! before its blank page, say) without re-running earlier steps.
//!
//! Steps still run strictly one after another; the stream is polled for the
//! next step only after the previous item has been taken.

use crate::config::PipelineConfig;
use crate::error::PdfPressError;
use crate::object::PdfObject;
use crate::pipeline::transform::{run_transformation, Transformation};
use futures::stream;
use std::path::PathBuf;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of transformation results.
pub type TransformStream = Pin<Box<dyn Stream<Item = Result<PdfObject, PdfPressError>> + Send>>;

struct ChainState {
    current: PdfObject,
    steps: std::vec::IntoIter<Transformation>,
    destination: PathBuf,
    config: PipelineConfig,
    failed: bool,
}

/// Apply `steps` to `source`, yielding one item per completed step.
///
/// The stream ends after the last step, or right after the first `Err`.
pub fn transform_stream(
    source: PdfObject,
    steps: Vec<Transformation>,
    destination: impl Into<PathBuf>,
    config: &PipelineConfig,
) -> TransformStream {
    info!(
        "Starting streaming chain of {} transformations on {}",
        steps.len(),
        source.id()
    );
    let state = ChainState {
        current: source,
        steps: steps.into_iter(),
        destination: destination.into(),
        config: config.clone(),
        failed: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        if state.failed {
            return None;
        }
        let step = state.steps.next()?;
        let result =
            run_transformation(&state.current, &step, &state.destination, &state.config).await;
        match result {
            Ok(next) => {
                state.current = next.clone();
                Some((Ok(next), state))
            }
            Err(e) => {
                state.failed = true;
                Some((Err(e), state))
            }
        }
    }))
}
