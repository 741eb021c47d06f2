//! Structured lifecycle events for a grading run.
//!
//! Every event carries an `event` field so JSON logs can be filtered on it.

use tracing::{info, warn};

use crate::kind::AnalysisKind;
use crate::verdict::Summary;

/// RAII guard that keeps a grading span entered for the duration of a run.
pub struct GradingSpan {
    _span: tracing::span::EnteredSpan,
}

impl GradingSpan {
    /// Create and enter a span tagged with the submission being graded.
    pub fn enter(submission: &str) -> Self {
        let span = tracing::info_span!("dlgrade.grading", submission = %submission);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_grading_started(kinds: usize, cases: usize) {
    info!(event = "grading.started", kinds = kinds, cases = cases);
}

/// Emit event: a kind was skipped because the submission has no artifact for it.
pub fn emit_kind_skipped(kind: AnalysisKind, cases: usize) {
    info!(event = "kind.skipped", kind = %kind, cases = cases);
}

/// Emit event: one test case was graded.
pub fn emit_case_evaluated(kind: AnalysisKind, test_id: &str, status: &str, duration_ms: u64) {
    info!(
        event = "case.evaluated",
        kind = %kind,
        test_id = %test_id,
        status = %status,
        duration_ms = duration_ms,
    );
}

/// Emit event: the analyzer could not be run to completion (warning level).
pub fn emit_invocation_failed(program: &std::path::Path, cause: &dyn std::fmt::Display) {
    warn!(event = "invocation.failed", program = %program.display(), cause = %cause);
}

pub fn emit_grading_finished(summary: &Summary, duration_ms: u64) {
    info!(
        event = "grading.finished",
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        invocation_failures = summary.invocation_failures,
        not_attempted = summary.not_attempted,
        duration_ms = duration_ms,
    );
}

/// Emit event: a report artifact was written.
pub fn emit_report_written(format: &str, path: &std::path::Path) {
    info!(event = "report.written", format = %format, path = %path.display());
}
