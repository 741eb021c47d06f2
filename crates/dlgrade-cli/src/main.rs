//! dlgrade - grader for static-analysis rule submissions
//!
//! ## Commands
//!
//! - `grade`: grade a submission against every analysis kind
//! - `test`: self-test a submission, optionally writing JSON and PDF reports
//!
//! Per-test failures are reported, not signalled: the exit code is non-zero
//! only when the corpus is broken or report tooling fails.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dlgrade_core::obs::{emit_report_written, GradingSpan};
use dlgrade_core::{AnalysisKind, Corpus, Submission};
use dlgrade_engine::{
    render_console, write_json_report, AnalyzerConfig, DocumentReport, Evaluator, GraderConfig,
    JsonReport, LatexTypesetter, ProcessAnalyzer, TypesetterConfig,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "dlgrade")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Grader for static-analysis rule submissions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission against every analysis kind
    Grade {
        #[command(flatten)]
        run: RunArgs,

        /// Write a PDF report with a diagram for each mismatch
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Self-test a submission (reaching-definitions kinds excluded by default)
    Test {
        #[command(flatten)]
        run: RunArgs,

        /// Write the full results as JSON
        #[arg(long, value_name = "FILE")]
        json_report: Option<PathBuf>,

        /// Write a PDF report with a diagram for each mismatch
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Test corpus: <DIR>/<kind>/<test id>/{program.c,positive.json,negative.json}
    #[arg(value_name = "DIR")]
    tests: PathBuf,

    /// Submission: <DIR>/<kind>.dl
    #[arg(value_name = "DIR")]
    submission: PathBuf,

    /// Analyzer command prefix
    #[arg(long, env = "DLGRADE_ANALYZER", default_value = "python3 analyse.py")]
    analyzer: String,

    /// Per-invocation timeout in seconds (0 disables)
    #[arg(long, env = "DLGRADE_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Maximum concurrent analyzer runs
    #[arg(short, long, env = "DLGRADE_JOBS", default_value_t = 1)]
    jobs: usize,

    /// LaTeX engine used for PDF reports
    #[arg(long, env = "DLGRADE_LATEX", default_value = "pdflatex")]
    latex: String,

    /// Analysis kinds to grade (comma-separated, e.g. dc_il1,uv_il2)
    #[arg(long, value_parser = parse_kind_list)]
    kinds: Option<KindList>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KindList(Vec<AnalysisKind>);

fn parse_kind_list(s: &str) -> std::result::Result<KindList, String> {
    AnalysisKind::parse_list(s)
        .map(KindList)
        .map_err(|e| e.to_string())
}

impl RunArgs {
    /// Resolve options against a front end's default kind profile.
    fn to_config(&self, profile: GraderConfig) -> GraderConfig {
        GraderConfig {
            kinds: self
                .kinds
                .as_ref()
                .map(|k| k.0.clone())
                .unwrap_or(profile.kinds),
            analyzer: AnalyzerConfig::from_command_line(&self.analyzer)
                .with_timeout(self.timeout_secs),
            typesetter: TypesetterConfig {
                command: self.latex.clone(),
                ..profile.typesetter
            },
            jobs: self.jobs.max(1),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    dlgrade_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Grade { run, report } => {
            let config = run.to_config(GraderConfig::default());
            cmd_grade(&run, &config, None, report.as_deref()).await
        }
        Commands::Test {
            run,
            json_report,
            report,
        } => {
            let config = run.to_config(GraderConfig::self_test());
            cmd_grade(&run, &config, json_report.as_deref(), report.as_deref()).await
        }
    }
}

/// Grade one submission and write the requested reports.
///
/// Reports are produced in order console, JSON, PDF, so a typesetting
/// failure leaves the earlier ones intact.
async fn cmd_grade(
    run: &RunArgs,
    config: &GraderConfig,
    json_report: Option<&Path>,
    pdf_report: Option<&Path>,
) -> Result<()> {
    let corpus = Corpus::load(&run.tests, &config.kinds)
        .with_context(|| format!("Failed to load test corpus from {}", run.tests.display()))?;
    let submission = Submission::discover(&run.submission, &config.kinds).with_context(|| {
        format!(
            "Failed to read submission from {}",
            run.submission.display()
        )
    })?;

    let _span = GradingSpan::enter(&run.submission.display().to_string());
    info!(
        cases = corpus.len(),
        attempted_kinds = submission.attempted_count(),
        "Grading submission"
    );

    let analyzer = Arc::new(ProcessAnalyzer::new(config.analyzer.clone()));
    let evaluator =
        Evaluator::new(analyzer.clone(), config.kinds.clone()).with_jobs(config.jobs);
    let matrix = evaluator.evaluate(&submission, &corpus).await;

    print!("{}", render_console(&matrix));

    if let Some(path) = json_report {
        write_json_report(path, &JsonReport::new(&submission, &matrix))
            .context("Failed to write JSON report")?;
        emit_report_written("json", path);
    }

    if let Some(path) = pdf_report {
        let document = DocumentReport {
            matrix: &matrix,
            corpus: &corpus,
            analyzer: analyzer.as_ref(),
        };
        document
            .write_pdf(&LatexTypesetter::new(config.typesetter.clone()), path)
            .await
            .context("Failed to generate PDF report")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_grade_uses_all_kinds() {
        let cli = Cli::try_parse_from(["dlgrade", "grade", "tests", "sub"]).unwrap();
        let Commands::Grade { run, report } = cli.command else {
            panic!("expected grade");
        };
        assert!(report.is_none());
        let config = run.to_config(GraderConfig::default());
        assert_eq!(config.kinds, AnalysisKind::ALL.to_vec());
        assert_eq!(config.analyzer.command, vec!["python3", "analyse.py"]);
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_test_command_with_reports_and_overrides() {
        let cli = Cli::try_parse_from([
            "dlgrade",
            "--verbose",
            "test",
            "tests",
            "sub",
            "--json-report",
            "out.json",
            "--report",
            "out.pdf",
            "--kinds",
            "uv_il1,dc_il1",
            "--analyzer",
            "sh fake.sh",
            "--timeout-secs",
            "7",
            "-j",
            "4",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Test {
            run,
            json_report,
            report,
        } = cli.command
        else {
            panic!("expected test");
        };
        assert_eq!(json_report, Some(PathBuf::from("out.json")));
        assert_eq!(report, Some(PathBuf::from("out.pdf")));

        let config = run.to_config(GraderConfig::self_test());
        assert_eq!(config.kinds, vec![AnalysisKind::DcIl1, AnalysisKind::UvIl1]);
        assert_eq!(config.analyzer.command, vec!["sh", "fake.sh"]);
        assert_eq!(config.analyzer.timeout_secs, 7);
        assert_eq!(config.jobs, 4);
    }

    #[test]
    fn test_self_test_profile_skips_reaching_definitions() {
        let cli = Cli::try_parse_from(["dlgrade", "test", "tests", "sub"]).unwrap();
        let Commands::Test { run, .. } = cli.command else {
            panic!("expected test");
        };
        let config = run.to_config(GraderConfig::self_test());
        assert!(!config.kinds.contains(&AnalysisKind::RdIl1));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let result = Cli::try_parse_from(["dlgrade", "grade", "tests", "sub", "--kinds", "zz_il1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_kind_list_rejected() {
        for list in ["", ","] {
            let result = Cli::try_parse_from(["dlgrade", "test", "tests", "sub", "--kinds", list]);
            assert!(result.is_err());
        }
    }
}
