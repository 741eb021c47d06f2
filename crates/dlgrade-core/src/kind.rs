//! Analysis kinds under test.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GradeError;

/// Supported static-analysis families, each in two intermediate-language variants.
///
/// Declaration order is the grading order; `Ord` follows it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnalysisKind {
    /// Dead code, IL1.
    #[serde(rename = "dc_il1")]
    DcIl1,
    /// Dead code, IL2.
    #[serde(rename = "dc_il2")]
    DcIl2,
    /// Dangling value, IL1.
    #[serde(rename = "dva_il1")]
    DvaIl1,
    /// Dangling value, IL2.
    #[serde(rename = "dva_il2")]
    DvaIl2,
    #[serde(rename = "nmoc_il1")]
    NmocIl1,
    #[serde(rename = "nmoc_il2")]
    NmocIl2,
    /// Reaching definitions, IL1.
    #[serde(rename = "rd_il1")]
    RdIl1,
    /// Reaching definitions, IL2.
    #[serde(rename = "rd_il2")]
    RdIl2,
    /// Uninitialised variable, IL1.
    #[serde(rename = "uv_il1")]
    UvIl1,
    /// Uninitialised variable, IL2.
    #[serde(rename = "uv_il2")]
    UvIl2,
}

impl AnalysisKind {
    /// Every kind, in grading order.
    pub const ALL: [AnalysisKind; 10] = [
        AnalysisKind::DcIl1,
        AnalysisKind::DcIl2,
        AnalysisKind::DvaIl1,
        AnalysisKind::DvaIl2,
        AnalysisKind::NmocIl1,
        AnalysisKind::NmocIl2,
        AnalysisKind::RdIl1,
        AnalysisKind::RdIl2,
        AnalysisKind::UvIl1,
        AnalysisKind::UvIl2,
    ];

    /// Kinds exercised by the self-test front end (no reaching definitions).
    pub const SELF_TEST: [AnalysisKind; 8] = [
        AnalysisKind::DcIl1,
        AnalysisKind::DcIl2,
        AnalysisKind::DvaIl1,
        AnalysisKind::DvaIl2,
        AnalysisKind::NmocIl1,
        AnalysisKind::NmocIl2,
        AnalysisKind::UvIl1,
        AnalysisKind::UvIl2,
    ];

    /// Get the kind name as used in directory and file names.
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::DcIl1 => "dc_il1",
            AnalysisKind::DcIl2 => "dc_il2",
            AnalysisKind::DvaIl1 => "dva_il1",
            AnalysisKind::DvaIl2 => "dva_il2",
            AnalysisKind::NmocIl1 => "nmoc_il1",
            AnalysisKind::NmocIl2 => "nmoc_il2",
            AnalysisKind::RdIl1 => "rd_il1",
            AnalysisKind::RdIl2 => "rd_il2",
            AnalysisKind::UvIl1 => "uv_il1",
            AnalysisKind::UvIl2 => "uv_il2",
        }
    }

    /// File name of the rule artifact a submission supplies for this kind.
    pub fn artifact_file_name(&self) -> String {
        format!("{}.dl", self.name())
    }

    /// Parse a comma-separated kind list such as `dc_il1,uv_il2`.
    ///
    /// Duplicates are dropped; the result is in grading order. A list that
    /// names no kind at all is rejected.
    pub fn parse_list(list: &str) -> Result<Vec<AnalysisKind>, GradeError> {
        let mut kinds = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(AnalysisKind::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if kinds.is_empty() {
            return Err(GradeError::EmptyKindList);
        }
        kinds.sort();
        kinds.dedup();
        Ok(kinds)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalysisKind {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        AnalysisKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| GradeError::UnknownKind(s.to_string()))
    }
}
