//! Evaluation of a submission against the fixture corpus.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use dlgrade_core::obs::{
    emit_case_evaluated, emit_grading_finished, emit_grading_started, emit_kind_skipped,
};
use dlgrade_core::{
    classify, AnalysisKind, Corpus, ResultMatrix, Submission, TestCase, TestId, Verdict,
};
use futures::stream::{self, StreamExt};
use tracing::info;

use crate::invoker::{Analyzer, Invocation};

/// Drives the analyzer over every (kind, test) pair and collects verdicts.
pub struct Evaluator {
    analyzer: Arc<dyn Analyzer>,
    kinds: Vec<AnalysisKind>,
    jobs: usize,
}

/// One attempted test case.
struct Job<'a> {
    kind: AnalysisKind,
    test_id: &'a TestId,
    case: &'a TestCase,
    rule: PathBuf,
}

impl Evaluator {
    pub fn new(analyzer: Arc<dyn Analyzer>, kinds: Vec<AnalysisKind>) -> Self {
        Self {
            analyzer,
            kinds,
            jobs: 1,
        }
    }

    /// Allow up to `jobs` concurrent analyzer runs. Output order is unaffected.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn kinds(&self) -> &[AnalysisKind] {
        &self.kinds
    }

    /// Grade `submission` against `corpus`.
    ///
    /// Kinds without a rule artifact map every test to `NotAttempted`.
    /// Analyzer failures become `InvocationFailure`; nothing here errors.
    pub async fn evaluate(&self, submission: &Submission, corpus: &Corpus) -> ResultMatrix {
        let start = Instant::now();
        let mut results: Vec<(AnalysisKind, TestId, Verdict)> = Vec::new();
        let mut jobs = Vec::new();

        for &kind in &self.kinds {
            match submission.artifact(kind) {
                None => {
                    let before = results.len();
                    results.extend(
                        corpus
                            .tests(kind)
                            .map(|(id, _)| (kind, id.clone(), Verdict::NotAttempted)),
                    );
                    emit_kind_skipped(kind, results.len() - before);
                }
                Some(artifact) => {
                    jobs.extend(corpus.tests(kind).map(|(test_id, case)| Job {
                        kind,
                        test_id,
                        case,
                        rule: artifact.path.clone(),
                    }));
                }
            }
        }

        emit_grading_started(self.kinds.len(), results.len() + jobs.len());

        // `buffered` yields in submission order, so per-task results are
        // merged after the fact and concurrency never reorders the matrix.
        let graded: Vec<(AnalysisKind, TestId, Verdict)> = stream::iter(jobs)
            .map(|job| self.evaluate_case(job))
            .buffered(self.jobs)
            .collect()
            .await;
        results.extend(graded);

        let matrix = ResultMatrix::from_results(&self.kinds, results);
        let duration_ms = start.elapsed().as_millis() as u64;
        emit_grading_finished(&matrix.summary(), duration_ms);
        info!(duration_ms = duration_ms, "Evaluation complete");
        matrix
    }

    async fn evaluate_case(&self, job: Job<'_>) -> (AnalysisKind, TestId, Verdict) {
        let start = Instant::now();
        let verdict = match self.analyzer.analyze(&job.rule, &job.case.program).await {
            Invocation::Completed(findings) => classify(&findings, job.case),
            Invocation::Failed(_) => Verdict::InvocationFailure,
        };
        emit_case_evaluated(
            job.kind,
            job.test_id,
            verdict.label(),
            start.elapsed().as_millis() as u64,
        );
        (job.kind, job.test_id.clone(), verdict)
    }
}
