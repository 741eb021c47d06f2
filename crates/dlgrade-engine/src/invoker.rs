//! Analyzer invocation.
//!
//! Grading mode never fails past this boundary: whatever goes wrong with the
//! analyzer comes back as [`Invocation::Failed`]. Diagram mode is tooling that
//! runs after a verdict is known, so its errors propagate.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use dlgrade_core::obs::emit_invocation_failed;
use dlgrade_core::{parse_finding_array, FindingId, GradeError, Result};
use tempfile::TempDir;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::process::{self, ProcessError, ProcessSpec};

/// Why an analyzer run produced no usable findings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureCause {
    #[error("could not create scratch directory: {0}")]
    Scratch(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("analyzer exited with code {0}")]
    ExitStatus(i32),

    #[error("analyzer output is not a JSON array of findings: {0}")]
    MalformedOutput(String),
}

/// Result of one grading-mode analyzer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Findings exactly as printed, duplicates and extras included.
    Completed(Vec<FindingId>),
    Failed(FailureCause),
}

/// The analyzer under test.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Run `rule` against `program` and collect the reported findings.
    async fn analyze(&self, rule: &Path, program: &Path) -> Invocation;

    /// Write the control-flow diagram of `program` to `dest`.
    async fn render_diagram(&self, program: &Path, dest: &Path) -> Result<()>;
}

/// Analyzer backed by an external process.
///
/// - grading: `<command> --analysis <rule> <program>`, JSON array on stdout
/// - diagram: `<command> --output-edb <dir> <program>`, writes the diagram into `<dir>`
#[derive(Debug, Clone)]
pub struct ProcessAnalyzer {
    config: AnalyzerConfig,
}

impl ProcessAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    async fn run_analysis(
        &self,
        rule: &Path,
        program: &Path,
    ) -> std::result::Result<Vec<FindingId>, FailureCause> {
        // Dropped on every return path, which removes the directory.
        let scratch = scratch_dir().map_err(|e| FailureCause::Scratch(e.to_string()))?;

        let rule = process::absolute(rule);
        let program = process::absolute(program);
        let output = process::run(ProcessSpec {
            command: &self.config.command,
            args: vec![OsStr::new("--analysis"), rule.as_os_str(), program.as_os_str()],
            work_dir: self.config.work_dir.as_deref(),
            scratch_dir: Some(scratch.path()),
            capture_stdout: true,
            timeout_secs: self.config.timeout_secs,
        })
        .await?;

        if !output.status.success() {
            return Err(FailureCause::ExitStatus(output.status.code().unwrap_or(-1)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_finding_array(&stdout).map_err(FailureCause::MalformedOutput)
    }
}

#[async_trait]
impl Analyzer for ProcessAnalyzer {
    async fn analyze(&self, rule: &Path, program: &Path) -> Invocation {
        match self.run_analysis(rule, program).await {
            Ok(findings) => {
                debug!(program = %program.display(), findings = findings.len(), "Analyzer completed");
                Invocation::Completed(findings)
            }
            Err(cause) => {
                emit_invocation_failed(program, &cause);
                Invocation::Failed(cause)
            }
        }
    }

    async fn render_diagram(&self, program: &Path, dest: &Path) -> Result<()> {
        let scratch = scratch_dir()?;
        let program_abs = process::absolute(program);
        let diagram_failed = |reason: String| GradeError::DiagramFailed {
            program: program.to_path_buf(),
            reason,
        };

        let output = process::run(ProcessSpec {
            command: &self.config.command,
            args: vec![
                OsStr::new("--output-edb"),
                scratch.path().as_os_str(),
                program_abs.as_os_str(),
            ],
            work_dir: self.config.work_dir.as_deref(),
            scratch_dir: Some(scratch.path()),
            capture_stdout: false,
            timeout_secs: self.config.timeout_secs,
        })
        .await
        .map_err(|e| diagram_failed(e.to_string()))?;

        if !output.status.success() {
            return Err(diagram_failed(format!(
                "analyzer exited with code {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let generated = scratch.path().join(&self.config.diagram_file);
        tokio::fs::copy(&generated, dest).await.map_err(|e| {
            diagram_failed(format!("cannot copy {}: {}", generated.display(), e))
        })?;
        Ok(())
    }
}

fn scratch_dir() -> std::io::Result<TempDir> {
    tempfile::Builder::new().prefix("dlgrade-").tempdir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Analyzer script: prints the rule file verbatim, or fails if it starts with `EXIT`.
    fn fake_analyzer(dir: &Path) -> ProcessAnalyzer {
        let script = dir.join("analyse.sh");
        fs::write(
            &script,
            r#"#!/bin/sh
if [ "$1" = "--output-edb" ]; then
  printf 'diagram for %s' "$3" > "$2/cfg.gv.pdf"
  exit 0
fi
case "$(cat "$2")" in
  EXIT*) echo '[]'; exit 3 ;;
esac
cat "$2"
"#,
        )
        .unwrap();
        ProcessAnalyzer::new(AnalyzerConfig {
            command: vec!["sh".to_string(), script.to_string_lossy().into_owned()],
            timeout_secs: 30,
            ..AnalyzerConfig::default()
        })
    }

    fn rule(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("rule.dl");
        fs::write(&path, body).unwrap();
        path
    }

    /// Analyzer script that records its `TMPDIR` and then fails in every mode.
    fn recording_analyzer(dir: &Path) -> (ProcessAnalyzer, std::path::PathBuf) {
        let record = dir.join("scratch.txt");
        let script = dir.join("record.sh");
        fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s' \"$TMPDIR\" > '{}'\nexit 2\n",
                record.display()
            ),
        )
        .unwrap();
        let analyzer = ProcessAnalyzer::new(AnalyzerConfig {
            command: vec!["sh".to_string(), script.to_string_lossy().into_owned()],
            timeout_secs: 30,
            ..AnalyzerConfig::default()
        });
        (analyzer, record)
    }

    fn recorded_scratch(record: &Path) -> std::path::PathBuf {
        std::path::PathBuf::from(fs::read_to_string(record).expect("analyzer did not run"))
    }

    #[tokio::test]
    async fn test_findings_returned_verbatim() {
        let tmp = TempDir::new().unwrap();
        let analyzer = fake_analyzer(tmp.path());
        let rule = rule(tmp.path(), r#"["a", "a", "zzz"]"#);

        let outcome = analyzer.analyze(&rule, Path::new("program.c")).await;
        assert_eq!(
            outcome,
            Invocation::Completed(vec!["a".into(), "a".into(), "zzz".into()])
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure_regardless_of_stdout() {
        let tmp = TempDir::new().unwrap();
        let analyzer = fake_analyzer(tmp.path());
        let rule = rule(tmp.path(), "EXIT");

        let outcome = analyzer.analyze(&rule, Path::new("program.c")).await;
        assert_eq!(outcome, Invocation::Failed(FailureCause::ExitStatus(3)));
    }

    #[tokio::test]
    async fn test_garbage_output_is_failure() {
        let tmp = TempDir::new().unwrap();
        let analyzer = fake_analyzer(tmp.path());
        let rule = rule(tmp.path(), "Traceback (most recent call last):");

        let outcome = analyzer.analyze(&rule, Path::new("program.c")).await;
        assert!(matches!(
            outcome,
            Invocation::Failed(FailureCause::MalformedOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_analyzer_is_failure() {
        let analyzer = ProcessAnalyzer::new(AnalyzerConfig {
            command: vec!["/nonexistent-analyzer".to_string()],
            ..AnalyzerConfig::default()
        });
        let outcome = analyzer
            .analyze(Path::new("rule.dl"), Path::new("program.c"))
            .await;
        assert!(matches!(
            outcome,
            Invocation::Failed(FailureCause::Process(ProcessError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_hanging_analyzer_times_out() {
        let analyzer = ProcessAnalyzer::new(AnalyzerConfig {
            command: vec!["sh".to_string(), "-c".to_string(), "sleep 10".to_string()],
            timeout_secs: 1,
            ..AnalyzerConfig::default()
        });
        let outcome = analyzer
            .analyze(Path::new("rule.dl"), Path::new("program.c"))
            .await;
        assert_eq!(
            outcome,
            Invocation::Failed(FailureCause::Process(ProcessError::TimedOut(1)))
        );
    }

    #[tokio::test]
    async fn test_render_diagram_copies_artifact() {
        let tmp = TempDir::new().unwrap();
        let analyzer = fake_analyzer(tmp.path());
        let dest = tmp.path().join("1.pdf");

        analyzer
            .render_diagram(Path::new("program.c"), &dest)
            .await
            .expect("diagram failed");
        let body = fs::read_to_string(&dest).unwrap();
        assert!(body.starts_with("diagram for"));
        assert!(body.ends_with("program.c"));
    }

    #[tokio::test]
    async fn test_render_diagram_failure_propagates() {
        let analyzer = ProcessAnalyzer::new(AnalyzerConfig {
            command: vec!["false".to_string()],
            ..AnalyzerConfig::default()
        });
        let tmp = TempDir::new().unwrap();
        let err = analyzer
            .render_diagram(Path::new("program.c"), &tmp.path().join("1.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::DiagramFailed { .. }));
    }

    #[tokio::test]
    async fn test_scratch_released_after_failed_analysis() {
        let tmp = TempDir::new().unwrap();
        let (analyzer, record) = recording_analyzer(tmp.path());
        let rule = rule(tmp.path(), "[]");

        let outcome = analyzer.analyze(&rule, Path::new("program.c")).await;
        assert_eq!(outcome, Invocation::Failed(FailureCause::ExitStatus(2)));

        let scratch = recorded_scratch(&record);
        assert!(scratch.to_string_lossy().contains("dlgrade-"));
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_scratch_released_after_failed_diagram() {
        let tmp = TempDir::new().unwrap();
        let (analyzer, record) = recording_analyzer(tmp.path());

        let err = analyzer
            .render_diagram(Path::new("program.c"), &tmp.path().join("1.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, GradeError::DiagramFailed { .. }));

        let scratch = recorded_scratch(&record);
        assert!(scratch.to_string_lossy().contains("dlgrade-"));
        assert!(!scratch.exists());
    }
}
