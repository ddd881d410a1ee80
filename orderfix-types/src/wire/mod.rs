use serde::{Deserialize, Serialize};

pub mod report_v1;
pub mod snapshot_v1;

pub use report_v1::ReportV1;
pub use snapshot_v1::{ContainerV1, MemberV1, SnapshotV1};

/// Tool information for wire-level schemas (schema-exact).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfoV1 {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// Errors emitted while converting wire models to internal models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    UnsupportedSchema { found: String },
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireError::UnsupportedSchema { found } => {
                write!(
                    f,
                    "unsupported snapshot schema '{}' (expected {})",
                    found,
                    crate::schema::ORDERFIX_SNAPSHOT_V1
                )
            }
        }
    }
}

impl std::error::Error for WireError {}

#[cfg(test)]
mod tests {
    use super::{ToolInfoV1, WireError};

    #[test]
    fn tool_info_serializes_without_commit_when_none() {
        let tool = ToolInfoV1 {
            name: "orderfix".to_string(),
            version: "0.1.0".to_string(),
            commit: None,
        };

        let json = serde_json::to_string(&tool).expect("serialize");
        assert!(json.contains("\"name\""));
        assert!(!json.contains("commit"));
    }

    #[test]
    fn wire_error_display_names_expected_schema() {
        let err = WireError::UnsupportedSchema {
            found: "other.v2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("other.v2"));
        assert!(msg.contains("orderfix.snapshot.v1"));
    }
}
