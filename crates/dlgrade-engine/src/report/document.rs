//! LaTeX report with an embedded control-flow diagram per mismatch.

use std::fmt::Write as _;
use std::path::Path;

use dlgrade_core::obs::emit_report_written;
use dlgrade_core::{Corpus, FindingId, GradeError, Result, ResultMatrix, Verdict};
use tempfile::TempDir;
use tracing::debug;

use crate::invoker::Analyzer;
use crate::report::typeset::LatexTypesetter;

const TEX_FILE: &str = "report.tex";

/// Builds the LaTeX source of the PDF report.
pub struct DocumentReport<'a> {
    pub matrix: &'a ResultMatrix,
    pub corpus: &'a Corpus,
    pub analyzer: &'a dyn Analyzer,
}

impl<'a> DocumentReport<'a> {
    /// Render the document source, writing one diagram per mismatching test
    /// into `figure_dir` as `<n>.pdf`.
    ///
    /// Diagram failures propagate.
    pub async fn render_source(&self, figure_dir: &Path) -> Result<String> {
        let mut tex = String::new();
        tex.push_str("\\documentclass[11pt,a4paper]{article}\n");
        tex.push_str("\\usepackage{graphicx}\n");
        tex.push_str("\\usepackage{listings}\n");
        tex.push_str("\\begin{document}\n");

        let mut failures = 0usize;
        for (kind, test_id, verdict) in self.matrix.iter() {
            let status = match verdict {
                Verdict::Pass => continue,
                Verdict::Fail { .. } => "FAIL",
                Verdict::InvocationFailure => "FAIL (analyzer error)",
                Verdict::NotAttempted => "FAIL (not attempted)",
            };
            failures += 1;
            let _ = write!(
                tex,
                "\\subsubsection*{{{}/test {}:\\quad {}}}\n\n",
                escape_tex(kind.name()),
                escape_tex(test_id),
                status
            );

            let false_alarms: Vec<&FindingId> = verdict.false_alarms().collect();
            let missed: Vec<&FindingId> = verdict.missed_violations().collect();
            if false_alarms.is_empty() && missed.is_empty() {
                continue;
            }

            tex.push_str("\\begin{itemize}\n");
            for finding in &false_alarms {
                let _ = writeln!(tex, "\\item False alarm: {}", inline_code(finding.as_str()));
            }
            for finding in &missed {
                let _ = writeln!(
                    tex,
                    "\\item Missed violation: {}",
                    inline_code(finding.as_str())
                );
            }
            tex.push_str("\\end{itemize}\n\n");

            let case = self.corpus.get(kind, test_id).ok_or_else(|| {
                GradeError::DiagramFailed {
                    program: Path::new(kind.name()).join(test_id),
                    reason: "test case missing from corpus".to_string(),
                }
            })?;
            let figure = format!("{}.pdf", failures);
            self.analyzer
                .render_diagram(&case.program, &figure_dir.join(&figure))
                .await?;
            debug!(kind = %kind, test_id = %test_id, figure = %figure, "Embedded diagram");
            let _ = write!(
                tex,
                "\\includegraphics[width=\\linewidth,height=0.8\\textheight,keepaspectratio]{{{}}}\n\n",
                figure
            );
        }

        if failures == 0 {
            tex.push_str("All tests pass!\n");
        }
        tex.push_str("\\end{document}\n");
        Ok(tex)
    }

    /// Render, typeset, and copy the PDF to `dest`.
    ///
    /// Any failure here is confined to the document; the caller decides
    /// whether other reports still matter.
    pub async fn write_pdf(&self, typesetter: &LatexTypesetter, dest: &Path) -> Result<()> {
        let work = TempDir::new()?;
        let source = self.render_source(work.path()).await?;
        tokio::fs::write(work.path().join(TEX_FILE), source).await?;

        let pdf = typesetter.typeset(work.path(), TEX_FILE).await?;
        tokio::fs::copy(&pdf, dest)
            .await
            .map_err(|source| GradeError::ReportIo {
                path: dest.to_path_buf(),
                source,
            })?;
        emit_report_written("pdf", dest);
        Ok(())
    }
}

/// Escape text for use outside verbatim contexts.
pub fn escape_tex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

/// `\lstinline` with a delimiter that does not occur in `code`.
fn inline_code(code: &str) -> String {
    const DELIMITERS: [char; 8] = ['|', '!', '+', '@', '=', ';', ':', '/'];
    match DELIMITERS.iter().find(|d| !code.contains(**d)) {
        Some(d) => format!("\\lstinline{d}{code}{d}"),
        None => format!("\\texttt{{{}}}", escape_tex(code)),
    }
}
