//! # engine-locate
//!
//! Find the external programs `pdfpress` drives: the HTML→PDF renderer
//! (`wkhtmltopdf`) and the LaTeX typesetting engine (`pdflatex`).
//!
//! ## How it works
//!
//! On the first call to [`locate`] for a given [`Engine`]:
//!
//! 1. Checks the engine's override variable (`PDFPRESS_RENDERER_PATH` /
//!    `PDFPRESS_TYPESETTER_PATH`).
//! 2. Checks the managed runtime root: `PDFPRESS_ENGINE_ROOT/bin/<name>`, then
//!    `LAMBDA_TASK_ROOT/bin/<name>` (binaries shipped next to a function
//!    bundle).
//! 3. Walks every `PATH` entry.
//! 4. Falls back to the user executable directory (`~/.local/bin` on Linux).
//!
//! The first existing file wins and is cached for the rest of the process.
//!
//! ```rust,no_run
//! use engine_locate::{locate, Engine};
//!
//! let pdflatex = locate(Engine::Typesetter).expect("pdflatex not installed");
//! println!("using {}", pdflatex.display());
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Variable naming an explicit root that contains a `bin/` directory of engines.
pub const ENGINE_ROOT_VAR: &str = "PDFPRESS_ENGINE_ROOT";

/// Root directory of a managed function runtime (AWS Lambda style).
pub const MANAGED_ROOT_VAR: &str = "LAMBDA_TASK_ROOT";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by engine-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// No candidate path held an executable file.
    #[error(
        "Could not find '{name}'. Searched {} location(s).\n\
Install it, or set {env_var}=/path/to/{name}.",
        searched.len()
    )]
    NotFound {
        name: String,
        env_var: &'static str,
        searched: Vec<PathBuf>,
    },
}

// ── Engines ──────────────────────────────────────────────────────────────────

/// An external program the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    /// HTML→PDF renderer (`wkhtmltopdf`).
    Renderer,
    /// LaTeX engine used for page-layout edits (`pdflatex`).
    Typesetter,
}

impl Engine {
    /// Bare program name, without platform suffix.
    pub fn program(self) -> &'static str {
        match self {
            Engine::Renderer => "wkhtmltopdf",
            Engine::Typesetter => "pdflatex",
        }
    }

    /// Environment variable that overrides the search for this engine.
    pub fn override_var(self) -> &'static str {
        match self {
            Engine::Renderer => "PDFPRESS_RENDERER_PATH",
            Engine::Typesetter => "PDFPRESS_TYPESETTER_PATH",
        }
    }

    /// File name on this platform (`pdflatex.exe` on Windows).
    pub fn file_name(self) -> String {
        format!("{}{}", self.program(), std::env::consts::EXE_SUFFIX)
    }
}

// ── Search inputs ────────────────────────────────────────────────────────────

/// Snapshot of everything the search reads from the environment.
///
/// [`locate_uncached`] builds one from the live process environment; tests
/// and embedders can build one by hand and call [`resolve_with`].
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    /// Value of the engine's override variable.
    pub override_path: Option<PathBuf>,
    /// Roots whose `bin/` directory is checked, in order.
    pub runtime_roots: Vec<PathBuf>,
    /// Raw `PATH` value.
    pub path_var: Option<OsString>,
    /// Per-user executable directory.
    pub user_bin: Option<PathBuf>,
}

impl SearchContext {
    /// Capture the current process environment for `engine`.
    pub fn from_env(engine: Engine) -> Self {
        let runtime_roots = [ENGINE_ROOT_VAR, MANAGED_ROOT_VAR]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .collect();

        Self {
            override_path: std::env::var_os(engine.override_var())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            runtime_roots,
            path_var: std::env::var_os("PATH"),
            user_bin: dirs::executable_dir(),
        }
    }

    /// All candidate paths for `engine`, in priority order.
    pub fn candidates(&self, engine: Engine) -> Vec<PathBuf> {
        let file_name = engine.file_name();
        let mut out = Vec::new();

        if let Some(ref p) = self.override_path {
            out.push(p.clone());
        }
        for root in &self.runtime_roots {
            out.push(root.join("bin").join(&file_name));
        }
        if let Some(ref path_var) = self.path_var {
            for dir in std::env::split_paths(path_var) {
                if !dir.as_os_str().is_empty() {
                    out.push(dir.join(&file_name));
                }
            }
        }
        if let Some(ref dir) = self.user_bin {
            out.push(dir.join(&file_name));
        }
        out
    }
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static RENDERER_PATH: OnceLock<PathBuf> = OnceLock::new();
static TYPESETTER_PATH: OnceLock<PathBuf> = OnceLock::new();

fn cache_for(engine: Engine) -> &'static OnceLock<PathBuf> {
    match engine {
        Engine::Renderer => &RENDERER_PATH,
        Engine::Typesetter => &TYPESETTER_PATH,
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Returns the path of `engine`, searching once per process.
///
/// # Thread safety
///
/// Safe to call from multiple threads; concurrent first calls may both
/// search, and both get the same answer.
pub fn locate(engine: Engine) -> Result<PathBuf, LocateError> {
    let cache = cache_for(engine);
    if let Some(path) = cache.get() {
        return Ok(path.clone());
    }

    let path = locate_uncached(engine)?;

    // Best-effort cache (ignore race; both threads found the same file).
    let _ = cache.set(path.clone());

    Ok(path)
}

/// Searches for `engine` against the live environment without caching.
pub fn locate_uncached(engine: Engine) -> Result<PathBuf, LocateError> {
    resolve_with(engine, &SearchContext::from_env(engine))
}

/// Returns `true` if [`locate_uncached`] would succeed right now.
pub fn is_available(engine: Engine) -> bool {
    locate_uncached(engine).is_ok()
}

/// Searches the candidates of `ctx` for `engine`.
pub fn resolve_with(engine: Engine, ctx: &SearchContext) -> Result<PathBuf, LocateError> {
    let candidates = ctx.candidates(engine);
    if let Some(found) = candidates.iter().find(|p| is_executable_file(p)) {
        return Ok(found.clone());
    }

    Err(LocateError::NotFound {
        name: engine.file_name(),
        env_var: engine.override_var(),
        searched: candidates,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
