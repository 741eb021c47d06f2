//! Machine-readable grading report.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use dlgrade_core::{AnalysisKind, GradeError, Result, ResultMatrix, Submission, Summary};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "1.0";

/// Grading results written for downstream aggregation across submissions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,

    /// Kind -> SHA-256 of the graded rule artifact, null when not submitted.
    pub submission: BTreeMap<AnalysisKind, Option<String>>,

    /// Kind -> test id -> verdict.
    pub results: ResultMatrix,
}

impl JsonReport {
    pub fn new(submission: &Submission, matrix: &ResultMatrix) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            summary: matrix.summary(),
            submission: submission.digests(),
            results: matrix.clone(),
        }
    }
}

/// Write the report as pretty-printed JSON.
pub fn write_json_report(path: &Path, report: &JsonReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report)?;
    std::fs::write(path, content).map_err(|source| GradeError::ReportIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a report written by [`write_json_report`].
pub fn read_json_report(path: &Path) -> Result<JsonReport> {
    let content = std::fs::read_to_string(path).map_err(|source| GradeError::ReportIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
