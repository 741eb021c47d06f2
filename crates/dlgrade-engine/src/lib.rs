//! dlgrade Engine
//!
//! Runs submitted rule files through the analyzer under test and reports the
//! results:
//! - [`invoker`] runs the analyzer process with a scratch directory and timeout
//! - [`evaluate`] grades a whole submission against the fixture corpus
//! - [`report`] renders console, JSON and PDF reports

pub mod config;
pub mod evaluate;
pub mod invoker;
pub mod process;
pub mod report;

pub use config::{AnalyzerConfig, GraderConfig, TypesetterConfig};
pub use evaluate::Evaluator;
pub use invoker::{Analyzer, FailureCause, Invocation, ProcessAnalyzer};
pub use report::{
    read_json_report, render_console, write_json_report, DocumentReport, JsonReport,
    LatexTypesetter,
};
