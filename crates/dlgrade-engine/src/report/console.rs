//! Plain-text report, one line per test case.

use std::fmt::Write as _;

use dlgrade_core::{FindingId, ResultMatrix, Verdict};

/// Render the console report.
///
/// Each line is `<kind>\t<test id>\t<status>` where status is `OK`, `FAIL`
/// (analyzer failure or kind not attempted), or the `FA:`/`MV:` breakdown of
/// a mismatch. A summary line follows.
pub fn render_console(matrix: &ResultMatrix) -> String {
    let mut out = String::new();
    for (kind, test_id, verdict) in matrix.iter() {
        let _ = write!(out, "{}\t{}", kind, test_id);
        match verdict {
            Verdict::Pass => out.push_str("\tOK"),
            Verdict::InvocationFailure | Verdict::NotAttempted => out.push_str("\tFAIL"),
            Verdict::Fail {
                false_alarms,
                missed_violations,
            } => {
                if !false_alarms.is_empty() {
                    let _ = write!(out, "\tFA: {}", finding_list(false_alarms));
                }
                if !missed_violations.is_empty() {
                    let _ = write!(out, "\tMV: {}", finding_list(missed_violations));
                }
            }
        }
        out.push('\n');
    }

    let summary = matrix.summary();
    let _ = writeln!(
        out,
        "Summary: {}/{} passed ({} failed, {} invocation failures, {} not attempted)",
        summary.passed,
        summary.total,
        summary.failed,
        summary.invocation_failures,
        summary.not_attempted
    );
    out
}

fn finding_list<'a>(findings: impl IntoIterator<Item = &'a FindingId>) -> String {
    let items: Vec<&str> = findings.into_iter().map(FindingId::as_str).collect();
    format!("[{}]", items.join(", "))
}
