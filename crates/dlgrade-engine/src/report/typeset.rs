//! LaTeX typesetting backend.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use dlgrade_core::{GradeError, Result};
use tracing::info;

use crate::config::TypesetterConfig;
use crate::process::{self, ProcessError, ProcessSpec};

/// Runs a LaTeX engine in batch mode.
#[derive(Debug, Clone, Default)]
pub struct LatexTypesetter {
    config: TypesetterConfig,
}

impl LatexTypesetter {
    pub fn new(config: TypesetterConfig) -> Self {
        Self { config }
    }

    /// Typeset `work_dir/tex_file` and return the path of the produced PDF.
    ///
    /// Fails loudly when the engine is missing, exits non-zero, or produces no PDF.
    pub async fn typeset(&self, work_dir: &Path, tex_file: &str) -> Result<PathBuf> {
        let command = vec![
            self.config.command.clone(),
            "-interaction=nonstopmode".to_string(),
        ];
        info!(engine = %self.config.command, file = %tex_file, "Typesetting report");

        let output = process::run(ProcessSpec {
            command: &command,
            args: vec![OsStr::new(tex_file)],
            work_dir: Some(work_dir),
            scratch_dir: None,
            capture_stdout: false,
            timeout_secs: self.config.timeout_secs,
        })
        .await
        .map_err(|e| match e {
            ProcessError::NotFound(engine) => GradeError::TypesetterNotFound(engine),
            other => GradeError::TypesetFailed(other.to_string()),
        })?;

        if !output.status.success() {
            return Err(GradeError::TypesetFailed(format!(
                "{} exited with code {}",
                self.config.command,
                output.status.code().unwrap_or(-1)
            )));
        }

        let pdf = work_dir.join(tex_file).with_extension("pdf");
        if !pdf.is_file() {
            return Err(GradeError::TypesetFailed(format!(
                "{} did not produce {}",
                self.config.command,
                pdf.display()
            )));
        }
        Ok(pdf)
    }
}
