use serde::{Deserialize, Serialize};

use crate::report::{Diagnostic, OrderfixReport, ReportArtifacts, RunInfo, Verdict};
use crate::wire::ToolInfoV1;

/// Schema-exact wire representation of orderfix.report.v1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportV1 {
    pub schema: String,
    pub tool: ToolInfoV1,
    pub run: RunInfo,
    pub verdict: Verdict,

    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ReportArtifacts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<&OrderfixReport> for ReportV1 {
    fn from(report: &OrderfixReport) -> Self {
        Self {
            schema: crate::schema::ORDERFIX_REPORT_V1.to_string(),
            tool: ToolInfoV1 {
                name: report.tool.name.clone(),
                version: report.tool.version.clone(),
                commit: report.tool.commit.clone(),
            },
            run: report.run.clone(),
            verdict: report.verdict.clone(),
            diagnostics: report.diagnostics.clone(),
            artifacts: report.artifacts.clone(),
            data: report.data.clone(),
        }
    }
}
