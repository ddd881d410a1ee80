use crate::load::SnapshotLoadError;
use anyhow::Context;
use camino::Utf8Path;
use orderfix_types::snapshot::Snapshot;
use orderfix_types::wire::SnapshotV1;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match path.extension().map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("json") => Some(SnapshotFormat::Json),
            Some("yaml") | Some("yml") => Some(SnapshotFormat::Yaml),
            _ => None,
        }
    }
}

pub fn parse_snapshot(format: SnapshotFormat, contents: &str) -> Result<Snapshot, SnapshotLoadError> {
    let wire: SnapshotV1 = match format {
        SnapshotFormat::Json => {
            serde_json::from_str(contents).map_err(|e| SnapshotLoadError::Parse {
                message: e.to_string(),
            })?
        }
        SnapshotFormat::Yaml => {
            serde_yaml::from_str(contents).map_err(|e| SnapshotLoadError::Parse {
                message: e.to_string(),
            })?
        }
    };

    Snapshot::try_from(wire).map_err(|e| SnapshotLoadError::Schema {
        message: e.to_string(),
    })
}

pub fn serialize_snapshot(format: SnapshotFormat, snapshot: &Snapshot) -> anyhow::Result<String> {
    let wire = SnapshotV1::from(snapshot);
    match format {
        SnapshotFormat::Json => {
            let mut s = serde_json::to_string_pretty(&wire).context("serialize snapshot json")?;
            s.push('\n');
            Ok(s)
        }
        SnapshotFormat::Yaml => serde_yaml::to_string(&wire).context("serialize snapshot yaml"),
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SnapshotFormat::from_path(Utf8Path::new("a/Foo.json")),
            Some(SnapshotFormat::Json)
        );
        assert_eq!(
            SnapshotFormat::from_path(Utf8Path::new("Foo.YML")),
            Some(SnapshotFormat::Yaml)
        );
        assert_eq!(SnapshotFormat::from_path(Utf8Path::new("Foo.cs")), None);
    }

    #[test]
    fn parse_reports_schema_errors_separately() {
        let err = parse_snapshot(
            SnapshotFormat::Json,
            r#"{ "schema": "nope.v1", "path": "a.cs" }"#,
        )
        .expect_err("schema");
        assert!(matches!(err, SnapshotLoadError::Schema { .. }));

        let err = parse_snapshot(SnapshotFormat::Json, "{").expect_err("parse");
        assert!(matches!(err, SnapshotLoadError::Parse { .. }));
    }

    #[test]
    fn sha256_is_hex_encoded() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
