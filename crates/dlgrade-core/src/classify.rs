//! Comparison of reported findings against expected positives and negatives.

use std::collections::{BTreeSet, HashSet};

use crate::finding::FindingId;
use crate::fixture::TestCase;
use crate::verdict::Verdict;

/// Classify one successful analyzer run.
///
/// - missed violations: expected positives that were not reported
/// - false alarms: expected negatives that were reported
///
/// Reported findings outside both expected sets are ignored.
pub fn classify(reported: &[FindingId], case: &TestCase) -> Verdict {
    let reported: HashSet<&FindingId> = reported.iter().collect();

    let missed_violations: BTreeSet<FindingId> = case
        .expected_positives
        .iter()
        .filter(|f| !reported.contains(f))
        .cloned()
        .collect();
    let false_alarms: BTreeSet<FindingId> = case
        .expected_negatives
        .iter()
        .filter(|f| reported.contains(f))
        .cloned()
        .collect();

    if missed_violations.is_empty() && false_alarms.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail {
            false_alarms,
            missed_violations,
        }
    }
}
