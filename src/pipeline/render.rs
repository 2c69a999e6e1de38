//! HTML→PDF rendering through an external engine.
//!
//! The engine sits behind [`HtmlRenderer`] so embedders can plug in their own
//! (a headless browser, a remote service, a test double). The default
//! [`CommandRenderer`] drives a `wkhtmltopdf`-compatible binary.
//!
//! The timeout is enforced here, around whichever renderer is in use, not
//! inside each implementation. Dropping a [`CommandRenderer`] future kills
//! its child, so a timed-out render does not leave the engine running.

use crate::config::{PipelineConfig, RenderOptions, RenderOverrides};
use crate::error::PdfPressError;
use engine_locate::{locate, Engine};
use futures::future::BoxFuture;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Converts an HTML document to PDF bytes.
pub trait HtmlRenderer: Send + Sync {
    /// Render `html` once with fully resolved `options`.
    fn render<'a>(
        &'a self,
        html: &'a str,
        options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, PdfPressError>>;
}

/// Renderer backed by a `wkhtmltopdf`-compatible command.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: PathBuf,
}

impl CommandRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use the renderer found by [`engine_locate`].
    pub fn locate() -> Result<Self, PdfPressError> {
        Ok(Self::new(locate(Engine::Renderer)?))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one render.
    pub fn build_args(options: &RenderOptions, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut flag = |name: &str, value: &str| {
            args.push(name.into());
            args.push(value.into());
        };
        flag("--page-width", &options.page_width);
        flag("--page-height", &options.page_height);
        flag("--margin-top", &options.margins.top);
        flag("--margin-right", &options.margins.right);
        flag("--margin-bottom", &options.margins.bottom);
        flag("--margin-left", &options.margins.left);
        args.push("--quiet".into());
        args.push("--enable-local-file-access".into());
        args.push(input.into());
        args.push(output.into());
        args
    }

    async fn run(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, PdfPressError> {
        let workdir = tempfile::TempDir::new()
            .map_err(|e| PdfPressError::Internal(format!("tempdir: {e}")))?;
        let input = workdir.path().join("document.html");
        let output = workdir.path().join("document.pdf");

        tokio::fs::write(&input, html)
            .await
            .map_err(|e| PdfPressError::io(&input, e))?;

        let args = Self::build_args(options, &input, &output);
        debug!("Running renderer: {} {:?}", self.program.display(), args);

        let out = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PdfPressError::Render {
                message: format!("failed to start {}: {e}", self.program.display()),
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} exited with {}", self.program.display(), out.status)
            } else {
                stderr
            };
            return Err(PdfPressError::Render { message });
        }

        tokio::fs::read(&output).await.map_err(|e| PdfPressError::Render {
            message: format!("renderer produced no output file: {e}"),
        })
    }
}

impl HtmlRenderer for CommandRenderer {
    fn render<'a>(
        &'a self,
        html: &'a str,
        options: &'a RenderOptions,
    ) -> BoxFuture<'a, Result<Vec<u8>, PdfPressError>> {
        Box::pin(self.run(html, options))
    }
}

/// Pick the renderer, from most-specific to least-specific.
///
/// 1. **Pre-built renderer** (`config.renderer`).
/// 2. **Explicit binary** (`config.renderer_path`).
/// 3. **Located binary**: `PDFPRESS_RENDERER_PATH`, managed runtime root,
///    then `PATH`.
pub fn resolve_renderer(config: &PipelineConfig) -> Result<Arc<dyn HtmlRenderer>, PdfPressError> {
    if let Some(ref renderer) = config.renderer {
        return Ok(Arc::clone(renderer));
    }
    if let Some(ref path) = config.renderer_path {
        return Ok(Arc::new(CommandRenderer::new(path)));
    }
    Ok(Arc::new(CommandRenderer::locate()?))
}

/// Render `html` with `overrides` merged over `config.render`.
///
/// One attempt, bounded by the merged `timeout_ms`.
pub async fn render_html(
    html: &str,
    overrides: &RenderOverrides,
    config: &PipelineConfig,
) -> Result<Vec<u8>, PdfPressError> {
    let options = config.render.merged(overrides);
    let renderer = resolve_renderer(config)?;
    debug!("Render options: {:?}", options);

    let start = Instant::now();
    let rendered = tokio::time::timeout(
        Duration::from_millis(options.timeout_ms),
        renderer.render(html, &options),
    )
    .await
    .map_err(|_| PdfPressError::RenderTimeout {
        timeout_ms: options.timeout_ms,
    })??;

    if rendered.is_empty() {
        return Err(PdfPressError::Render {
            message: "renderer returned an empty document".into(),
        });
    }

    info!(
        "Rendered {} bytes of HTML to {} bytes of PDF in {}ms",
        html.len(),
        rendered.len(),
        start.elapsed().as_millis()
    );
    Ok(rendered)
}
