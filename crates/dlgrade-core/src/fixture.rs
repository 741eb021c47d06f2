//! Fixture corpus loading.
//!
//! Expected layout:
//!
//! ```text
//! <root>/<kind>/<test id>/program.c
//! <root>/<kind>/<test id>/positive.json
//! <root>/<kind>/<test id>/negative.json
//! ```
//!
//! Loading fails fast: a missing or malformed fixture is a corpus bug and
//! must never surface as a grading verdict.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GradeError, Result};
use crate::finding::{parse_finding_array, FindingId};
use crate::kind::AnalysisKind;

pub const PROGRAM_FILE: &str = "program.c";
pub const POSITIVE_FILE: &str = "positive.json";
pub const NEGATIVE_FILE: &str = "negative.json";

/// Name of a test case directory.
pub type TestId = String;

/// A single test program with its expected findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCase {
    /// Path of the source program handed to the analyzer.
    pub program: PathBuf,

    /// Findings the analyzer must report.
    pub expected_positives: BTreeSet<FindingId>,

    /// Findings the analyzer must not report.
    pub expected_negatives: BTreeSet<FindingId>,
}

impl TestCase {
    pub fn new(
        program: impl Into<PathBuf>,
        expected_positives: impl IntoIterator<Item = FindingId>,
        expected_negatives: impl IntoIterator<Item = FindingId>,
    ) -> Self {
        Self {
            program: program.into(),
            expected_positives: expected_positives.into_iter().collect(),
            expected_negatives: expected_negatives.into_iter().collect(),
        }
    }
}

/// Analysis kind -> test id -> test case. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    kinds: BTreeMap<AnalysisKind, BTreeMap<TestId, TestCase>>,
}

impl Corpus {
    /// Load the corpus for `kinds` from `root`.
    ///
    /// Test ids are the immediate subdirectories of `root/<kind>/`, kept in
    /// lexicographic order so reports are stable across runs.
    pub fn load(root: &Path, kinds: &[AnalysisKind]) -> Result<Self> {
        let mut corpus = Corpus::default();
        for &kind in kinds {
            let kind_dir = root.join(kind.name());
            if !kind_dir.is_dir() {
                return Err(GradeError::MissingKindDirectory {
                    kind: kind.to_string(),
                    path: kind_dir,
                });
            }
            let mut tests = BTreeMap::new();
            for test_id in load_test_ids(&kind_dir)? {
                let case = load_test_case(&kind_dir.join(&test_id))?;
                tests.insert(test_id, case);
            }
            debug!(kind = %kind, tests = tests.len(), "Loaded fixtures");
            corpus.kinds.insert(kind, tests);
        }
        Ok(corpus)
    }

    /// Insert a test case directly, replacing any previous one with the same id.
    pub fn insert(&mut self, kind: AnalysisKind, test_id: impl Into<TestId>, case: TestCase) {
        self.kinds.entry(kind).or_default().insert(test_id.into(), case);
    }

    /// Tests of one kind, empty if the kind was not loaded.
    pub fn tests(&self, kind: AnalysisKind) -> impl Iterator<Item = (&TestId, &TestCase)> {
        self.kinds.get(&kind).into_iter().flat_map(|tests| tests.iter())
    }

    /// Look up one test case.
    pub fn get(&self, kind: AnalysisKind, test_id: &str) -> Option<&TestCase> {
        self.kinds.get(&kind).and_then(|tests| tests.get(test_id))
    }

    /// Loaded kinds in grading order.
    pub fn kinds(&self) -> impl Iterator<Item = AnalysisKind> + '_ {
        self.kinds.keys().copied()
    }

    /// Total number of test cases.
    pub fn len(&self) -> usize {
        self.kinds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_test_ids(kind_dir: &Path) -> Result<Vec<TestId>> {
    let entries = fs::read_dir(kind_dir).map_err(|source| GradeError::FixtureIo {
        path: kind_dir.to_path_buf(),
        source,
    })?;
    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GradeError::FixtureIo {
            path: kind_dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            ids.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    ids.sort();
    Ok(ids)
}

fn load_test_case(test_dir: &Path) -> Result<TestCase> {
    let program = test_dir.join(PROGRAM_FILE);
    if !program.is_file() {
        return Err(GradeError::MissingFixture(program));
    }
    let expected_positives = load_finding_set(&test_dir.join(POSITIVE_FILE))?;
    let expected_negatives = load_finding_set(&test_dir.join(NEGATIVE_FILE))?;
    Ok(TestCase {
        program,
        expected_positives,
        expected_negatives,
    })
}

fn load_finding_set(path: &Path) -> Result<BTreeSet<FindingId>> {
    let text = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            GradeError::MissingFixture(path.to_path_buf())
        } else {
            GradeError::FixtureIo {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let findings = parse_finding_array(&text).map_err(|reason| GradeError::MalformedFixture {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(findings.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_case(root: &Path, kind: &str, id: &str, positive: &str, negative: &str) {
        let dir = root.join(kind).join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROGRAM_FILE), "int main() { return 0; }\n").unwrap();
        fs::write(dir.join(POSITIVE_FILE), positive).unwrap();
        fs::write(dir.join(NEGATIVE_FILE), negative).unwrap();
    }

    #[test]
    fn test_load_two_level_corpus() {
        let tmp = TempDir::new().unwrap();
        write_case(tmp.path(), "dc_il1", "t2", r#"["c"]"#, "[]");
        write_case(tmp.path(), "dc_il1", "t1", r#"["a"]"#, r#"["b"]"#);
        // Stray files next to test directories are not tests.
        fs::write(tmp.path().join("dc_il1").join("README"), "notes").unwrap();

        let corpus = Corpus::load(tmp.path(), &[AnalysisKind::DcIl1]).unwrap();
        assert_eq!(corpus.len(), 2);

        let ids: Vec<&TestId> = corpus.tests(AnalysisKind::DcIl1).map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["t1", "t2"]);

        let t1 = corpus.get(AnalysisKind::DcIl1, "t1").unwrap();
        assert!(t1.expected_positives.contains(&FindingId::from("a")));
        assert!(t1.expected_negatives.contains(&FindingId::from("b")));
        assert!(t1.program.ends_with("dc_il1/t1/program.c"));
    }

    #[test]
    fn test_kind_without_tests_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("uv_il1")).unwrap();
        let corpus = Corpus::load(tmp.path(), &[AnalysisKind::UvIl1]).unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.kinds().collect::<Vec<_>>(), vec![AnalysisKind::UvIl1]);
    }

    #[test]
    fn test_missing_kind_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = Corpus::load(tmp.path(), &[AnalysisKind::RdIl1]).unwrap_err();
        assert!(matches!(err, GradeError::MissingKindDirectory { .. }));
    }

    #[test]
    fn test_missing_negative_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_case(tmp.path(), "dc_il1", "t1", "[]", "[]");
        fs::remove_file(tmp.path().join("dc_il1/t1").join(NEGATIVE_FILE)).unwrap();

        let err = Corpus::load(tmp.path(), &[AnalysisKind::DcIl1]).unwrap_err();
        assert!(matches!(err, GradeError::MissingFixture(ref p) if p.ends_with(NEGATIVE_FILE)));
        assert!(err.is_corpus_integrity());
    }

    #[test]
    fn test_missing_program_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_case(tmp.path(), "dc_il1", "t1", "[]", "[]");
        fs::remove_file(tmp.path().join("dc_il1/t1").join(PROGRAM_FILE)).unwrap();

        let err = Corpus::load(tmp.path(), &[AnalysisKind::DcIl1]).unwrap_err();
        assert!(matches!(err, GradeError::MissingFixture(ref p) if p.ends_with(PROGRAM_FILE)));
    }

    #[test]
    fn test_malformed_positive_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_case(tmp.path(), "dc_il1", "t1", r#"{"a": 1}"#, "[]");
        let err = Corpus::load(tmp.path(), &[AnalysisKind::DcIl1]).unwrap_err();
        assert!(matches!(err, GradeError::MalformedFixture { .. }));
    }
}
