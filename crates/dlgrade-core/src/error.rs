//! Error taxonomy for dlgrade.
//!
//! Only failures outside the per-test boundary live here. An analyzer that
//! crashes or prints garbage is a verdict, not an error.

use std::path::PathBuf;

/// dlgrade errors.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("fixture directory missing for analysis {kind}: {path}")]
    MissingKindDirectory { kind: String, path: PathBuf },

    #[error("missing fixture file: {0}")]
    MissingFixture(PathBuf),

    #[error("malformed fixture {path}: {reason}")]
    MalformedFixture { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    FixtureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read rule artifact {path}: {source}")]
    SubmissionIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown analysis kind: {0}")]
    UnknownKind(String),

    #[error("no analysis kinds selected")]
    EmptyKindList,

    #[error("diagram generation failed for {program}: {reason}")]
    DiagramFailed { program: PathBuf, reason: String },

    #[error("typesetter not found: {0}")]
    TypesetterNotFound(String),

    #[error("typesetting failed: {0}")]
    TypesetFailed(String),

    #[error("failed to write report {path}: {source}")]
    ReportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradeError {
    /// Whether this error means the fixture corpus itself cannot be trusted.
    pub fn is_corpus_integrity(&self) -> bool {
        matches!(
            self,
            GradeError::MissingKindDirectory { .. }
                | GradeError::MissingFixture(_)
                | GradeError::MalformedFixture { .. }
                | GradeError::FixtureIo { .. }
        )
    }
}

/// Result type for dlgrade operations.
pub type Result<T> = std::result::Result<T, GradeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fixture_display() {
        let err = GradeError::MissingFixture(PathBuf::from("tests/dc_il1/t1/positive.json"));
        let msg = err.to_string();
        assert!(msg.contains("missing fixture file"));
        assert!(msg.contains("positive.json"));
    }

    #[test]
    fn test_corpus_integrity_classification() {
        assert!(GradeError::MissingFixture(PathBuf::from("x")).is_corpus_integrity());
        assert!(GradeError::MalformedFixture {
            path: PathBuf::from("x"),
            reason: "not an array".to_string(),
        }
        .is_corpus_integrity());
        assert!(!GradeError::TypesetterNotFound("pdflatex".to_string()).is_corpus_integrity());
    }

    #[test]
    fn test_submission_io_is_not_corpus_integrity() {
        let err = GradeError::SubmissionIo {
            path: PathBuf::from("submission/dc_il1.dl"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!err.is_corpus_integrity());
        assert!(err.to_string().contains("rule artifact"));
    }
}
