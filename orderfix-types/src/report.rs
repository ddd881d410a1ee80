use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderfixReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub verdict: Verdict,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,

    /// Pointers to related artifact files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ReportArtifacts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub status: ReportStatus,
    pub counts: ReportCounts,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub info: u64,
    pub warn: u64,
    pub error: u64,

    /// Declarations relocated by a fix run.
    #[serde(default)]
    pub fixed: u64,
}

/// One reported condition: an ordering violation or an unbalanced region marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub container: String,
    pub message: String,
    pub location: ReportLocation,

    #[serde(default)]
    pub fixable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_order: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportLocation {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl From<&crate::model::Location> for ReportLocation {
    fn from(loc: &crate::model::Location) -> Self {
        Self {
            path: loc.file.to_string(),
            line: Some(u64::from(loc.line)),
        }
    }
}

/// Pointers to related artifact files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_dir: Option<String>,
}

impl ReportCounts {
    pub fn tally(diagnostics: &[Diagnostic]) -> Self {
        let mut counts = ReportCounts::default();
        for d in diagnostics {
            match d.severity {
                Severity::Info => counts.info += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts
    }

    pub fn status(&self) -> ReportStatus {
        if self.error > 0 {
            ReportStatus::Fail
        } else if self.warn > 0 {
            ReportStatus::Warn
        } else {
            ReportStatus::Pass
        }
    }
}
