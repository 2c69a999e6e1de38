//! Typesetting engine subprocess.
//!
//! The engine gets no stdin, so an error that would normally drop it into
//! interactive mode ends the run instead of hanging. There is no timeout and
//! the child is not killed if the future is dropped.

use crate::error::PdfPressError;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, warn};

/// Everything the engine reported, captured once at exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypesetOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stderr: String,
    pub stdout: String,
}

impl TypesetOutcome {
    /// Interpret the outcome. Any stderr output is an error, even with a
    /// zero exit status.
    pub fn check(&self, program: &str) -> Result<(), PdfPressError> {
        if !self.stderr.is_empty() {
            return Err(PdfPressError::Typesetting {
                stderr: self.stderr.clone(),
            });
        }
        match self.exit_code {
            Some(0) => Ok(()),
            code => Err(PdfPressError::TypesettingFailed {
                program: program.to_string(),
                code: code.unwrap_or(-1),
            }),
        }
    }
}

/// Arguments for one run: `-jobname=<job> -output-directory=<dir> <input>`.
pub fn engine_args(job_name: &str, output_dir: &Path, input: &Path) -> Vec<OsString> {
    let mut jobname = OsString::from("-jobname=");
    jobname.push(job_name);
    let mut outdir = OsString::from("-output-directory=");
    outdir.push(output_dir);
    vec![jobname, outdir, input.into()]
}

/// Run the engine to completion and collect its output.
pub async fn run_engine(
    program: &Path,
    job_name: &str,
    output_dir: &Path,
    input: &Path,
) -> Result<TypesetOutcome, PdfPressError> {
    let args = engine_args(job_name, output_dir, input);
    debug!("Spawning {} {:?}", program.display(), args);

    let output = tokio::process::Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => PdfPressError::EngineNotFound(format!(
                "typesetting engine '{}' does not exist",
                program.display()
            )),
            _ => PdfPressError::io(program, e),
        })?;

    let outcome = TypesetOutcome {
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    };
    if outcome.exit_code.is_none() {
        warn!("{} terminated by a signal", program.display());
    }
    debug!(
        "{} exited with {:?} ({} bytes stdout, {} bytes stderr)",
        program.display(),
        outcome.exit_code,
        outcome.stdout.len(),
        outcome.stderr.len()
    );
    Ok(outcome)
}

/// Short program name for error messages, e.g. `pdflatex`.
pub fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}
