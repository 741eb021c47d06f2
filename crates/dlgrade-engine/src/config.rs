//! Grader configuration.

use dlgrade_core::AnalysisKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How to run the analyzer under test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Command prefix (first element is the executable). Mode flags and paths are appended.
    pub command: Vec<String>,

    /// Working directory for the analyzer process. `None` inherits ours.
    pub work_dir: Option<PathBuf>,

    /// Per-invocation timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,

    /// Name of the diagram the analyzer writes in `--output-edb` mode.
    pub diagram_file: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            command: vec!["python3".to_string(), "analyse.py".to_string()],
            work_dir: None,
            timeout_secs: 120,
            diagram_file: "cfg.gv.pdf".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Build from a whitespace-separated command line such as `python3 analyse.py`.
    pub fn from_command_line(command: &str) -> Self {
        Self {
            command: command.split_whitespace().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// How to turn LaTeX source into a PDF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypesetterConfig {
    /// LaTeX engine executable.
    pub command: String,

    /// Timeout for one typesetting pass in seconds (0 = no timeout).
    pub timeout_secs: u64,
}

impl Default for TypesetterConfig {
    fn default() -> Self {
        Self {
            command: "pdflatex".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Configuration for one grading run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraderConfig {
    /// Kinds to grade, in grading order.
    pub kinds: Vec<AnalysisKind>,

    pub analyzer: AnalyzerConfig,

    pub typesetter: TypesetterConfig,

    /// Maximum concurrent analyzer invocations (1 = sequential).
    pub jobs: usize,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            kinds: AnalysisKind::ALL.to_vec(),
            analyzer: AnalyzerConfig::default(),
            typesetter: TypesetterConfig::default(),
            jobs: 1,
        }
    }
}

impl GraderConfig {
    /// Configuration for the self-test front end.
    pub fn self_test() -> Self {
        Self {
            kinds: AnalysisKind::SELF_TEST.to_vec(),
            ..Self::default()
        }
    }
}
