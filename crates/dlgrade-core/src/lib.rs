//! dlgrade Core
//!
//! Domain model for grading static-analysis rule submissions:
//! - analysis kinds and the fixture corpus
//! - submitted rule artifacts
//! - classification of analyzer findings into verdicts
//! - the result matrix every report is rendered from

pub mod classify;
pub mod error;
pub mod finding;
pub mod fixture;
pub mod kind;
pub mod obs;
pub mod submission;
pub mod telemetry;
pub mod verdict;

pub use classify::classify;
pub use error::{GradeError, Result};
pub use finding::{parse_finding_array, FindingId};
pub use fixture::{Corpus, TestCase, TestId};
pub use kind::AnalysisKind;
pub use submission::{RuleArtifact, Submission};
pub use telemetry::init_tracing;
pub use verdict::{ResultMatrix, Summary, Verdict};

/// dlgrade version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
