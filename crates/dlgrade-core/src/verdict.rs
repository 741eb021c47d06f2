//! Per-test verdicts and the result matrix consumed by every renderer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::finding::FindingId;
use crate::fixture::TestId;
use crate::kind::AnalysisKind;

/// Outcome of grading one test case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// Every expected positive reported, no expected negative reported.
    Pass,

    /// The analyzer ran but its findings did not match.
    Fail {
        false_alarms: BTreeSet<FindingId>,
        missed_violations: BTreeSet<FindingId>,
    },

    /// The analyzer exited unsuccessfully, timed out, or printed unparseable output.
    InvocationFailure,

    /// The submission has no rule artifact for this kind.
    NotAttempted,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// False alarms, empty unless this is a `Fail`.
    pub fn false_alarms(&self) -> impl Iterator<Item = &FindingId> {
        match self {
            Verdict::Fail { false_alarms, .. } => Some(false_alarms.iter()),
            _ => None,
        }
        .into_iter()
        .flatten()
    }

    /// Missed violations, empty unless this is a `Fail`.
    pub fn missed_violations(&self) -> impl Iterator<Item = &FindingId> {
        match self {
            Verdict::Fail {
                missed_violations, ..
            } => Some(missed_violations.iter()),
            _ => None,
        }
        .into_iter()
        .flatten()
    }

    /// Short status word used by text renderers.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail { .. } => "fail",
            Verdict::InvocationFailure => "invocation_failure",
            Verdict::NotAttempted => "not_attempted",
        }
    }
}

/// Analysis kind -> test id -> verdict.
///
/// Built once per grading run and only read afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResultMatrix {
    kinds: BTreeMap<AnalysisKind, BTreeMap<TestId, Verdict>>,
}

impl ResultMatrix {
    /// Assemble a matrix from per-case results gathered by the evaluator.
    ///
    /// `kinds` are registered even when they have no test cases, so every
    /// graded kind shows up in the output.
    pub fn from_results(
        kinds: &[AnalysisKind],
        results: impl IntoIterator<Item = (AnalysisKind, TestId, Verdict)>,
    ) -> Self {
        let mut matrix = ResultMatrix::default();
        for &kind in kinds {
            matrix.kinds.entry(kind).or_default();
        }
        for (kind, test_id, verdict) in results {
            matrix.kinds.entry(kind).or_default().insert(test_id, verdict);
        }
        matrix
    }

    /// All verdicts in grading order.
    pub fn iter(&self) -> impl Iterator<Item = (AnalysisKind, &TestId, &Verdict)> {
        self.kinds
            .iter()
            .flat_map(|(kind, tests)| tests.iter().map(move |(id, v)| (*kind, id, v)))
    }

    /// Verdicts of one kind.
    pub fn kind(&self, kind: AnalysisKind) -> Option<&BTreeMap<TestId, Verdict>> {
        self.kinds.get(&kind)
    }

    pub fn get(&self, kind: AnalysisKind, test_id: &str) -> Option<&Verdict> {
        self.kinds.get(&kind).and_then(|tests| tests.get(test_id))
    }

    /// Graded kinds in grading order.
    pub fn kinds(&self) -> impl Iterator<Item = AnalysisKind> + '_ {
        self.kinds.keys().copied()
    }

    /// Aggregate counts over the whole matrix.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for (_, _, verdict) in self.iter() {
            summary.total += 1;
            match verdict {
                Verdict::Pass => summary.passed += 1,
                Verdict::Fail { .. } => summary.failed += 1,
                Verdict::InvocationFailure => summary.invocation_failures += 1,
                Verdict::NotAttempted => summary.not_attempted += 1,
            }
        }
        summary
    }
}

/// Verdict counts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub invocation_failures: usize,
    pub not_attempted: usize,
}

impl Summary {
    /// Whether every test case passed.
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}
