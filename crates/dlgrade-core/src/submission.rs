//! Submitted rule artifacts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{GradeError, Result};
use crate::kind::AnalysisKind;

/// One kind's rule artifact, identified by content digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleArtifact {
    pub path: PathBuf,

    /// SHA-256 of the file contents, hex encoded.
    pub digest: String,
}

/// Analysis kind -> rule artifact, absent when the submission skipped the kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Submission {
    artifacts: BTreeMap<AnalysisKind, Option<RuleArtifact>>,
}

impl Submission {
    /// Look for `<dir>/<kind>.dl` for each kind.
    ///
    /// A missing artifact is recorded as `None`; it is not an error.
    pub fn discover(dir: &Path, kinds: &[AnalysisKind]) -> Result<Self> {
        let mut artifacts = BTreeMap::new();
        for &kind in kinds {
            let path = dir.join(kind.artifact_file_name());
            let artifact = if path.is_file() {
                let bytes = std::fs::read(&path).map_err(|source| GradeError::SubmissionIo {
                    path: path.clone(),
                    source,
                })?;
                Some(RuleArtifact {
                    digest: compute_digest(&bytes),
                    path,
                })
            } else {
                None
            };
            artifacts.insert(kind, artifact);
        }
        Ok(Self { artifacts })
    }

    /// Record an artifact path without reading it.
    pub fn with_artifact(mut self, kind: AnalysisKind, path: impl Into<PathBuf>) -> Self {
        self.artifacts.insert(
            kind,
            Some(RuleArtifact {
                path: path.into(),
                digest: String::new(),
            }),
        );
        self
    }

    /// Record that `kind` was not submitted.
    pub fn without_artifact(mut self, kind: AnalysisKind) -> Self {
        self.artifacts.insert(kind, None);
        self
    }

    /// Rule artifact for `kind`, if one was supplied.
    pub fn artifact(&self, kind: AnalysisKind) -> Option<&RuleArtifact> {
        self.artifacts.get(&kind).and_then(Option::as_ref)
    }

    /// Kind -> artifact digest, `None` for skipped kinds.
    pub fn digests(&self) -> BTreeMap<AnalysisKind, Option<String>> {
        self.artifacts
            .iter()
            .map(|(kind, artifact)| (*kind, artifact.as_ref().map(|a| a.digest.clone())))
            .collect()
    }

    /// Number of kinds with an artifact.
    pub fn attempted_count(&self) -> usize {
        self.artifacts.values().filter(|a| a.is_some()).count()
    }
}

/// Hex SHA-256 of artifact bytes.
fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
