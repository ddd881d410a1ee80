use crate::format::{SnapshotFormat, parse_snapshot, sha256_hex};
use anyhow::Context;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use orderfix_types::snapshot::Snapshot;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    /// Path of the snapshot document on disk.
    pub path: Utf8PathBuf,
    pub format: SnapshotFormat,

    /// sha256 of the bytes that were read, used as a write precondition.
    pub sha256: Option<String>,
    pub snapshot: Result<Snapshot, SnapshotLoadError>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("schema error: {message}")]
    Schema { message: String },
}

/// Load every `*.json`, `*.yaml` and `*.yml` snapshot under `dir`, recursively.
pub fn load_snapshots(dir: &Utf8Path) -> anyhow::Result<Vec<LoadedSnapshot>> {
    load_snapshots_excluding(dir, None)
}

/// Like [`load_snapshots`], also skipping everything under `exclude` (the report directory
/// when it sits inside the snapshot tree).
pub fn load_snapshots_excluding(
    dir: &Utf8Path,
    exclude: Option<&Utf8Path>,
) -> anyhow::Result<Vec<LoadedSnapshot>> {
    let excluded = exclude.map(Excluded::new);
    let mut out = Vec::new();

    for ext in ["json", "yaml", "yml"] {
        let pattern = dir.join(format!("**/*.{ext}"));
        let pattern_str = pattern.as_str();
        debug!(pattern = %pattern_str, "scanning for snapshots");

        for entry in glob(pattern_str).with_context(|| format!("glob {}", pattern_str))? {
            let path = entry
                .map_err(|e| anyhow::anyhow!("glob error: {e}"))?
                .to_string_lossy()
                .to_string();
            let utf8_path = Utf8PathBuf::from(path);

            if is_orderfix_output(&utf8_path) {
                debug!(path = %utf8_path, "skipping orderfix's own output");
                continue;
            }
            if excluded.as_ref().is_some_and(|e| e.contains(&utf8_path)) {
                debug!(path = %utf8_path, "skipping excluded directory");
                continue;
            }

            let Some(format) = SnapshotFormat::from_path(&utf8_path) else {
                continue;
            };

            out.push(load_one(utf8_path, format));
        }
    }

    // Deterministic order matters.
    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}

fn load_one(path: Utf8PathBuf, format: SnapshotFormat) -> LoadedSnapshot {
    match fs::read(&path) {
        Ok(bytes) => {
            let sha256 = Some(sha256_hex(&bytes));
            let snapshot = match String::from_utf8(bytes) {
                Ok(s) => parse_snapshot(format, &s),
                Err(e) => Err(SnapshotLoadError::Io {
                    message: e.to_string(),
                }),
            };
            LoadedSnapshot {
                path,
                format,
                sha256,
                snapshot,
            }
        }
        Err(e) => LoadedSnapshot {
            path,
            format,
            sha256: None,
            snapshot: Err(SnapshotLoadError::Io {
                message: e.to_string(),
            }),
        },
    }
}

fn is_orderfix_output(path: &Utf8Path) -> bool {
    let p = path.as_str().replace('\\', "/").to_ascii_lowercase();
    p.starts_with("artifacts/orderfix/") || p.contains("/artifacts/orderfix/")
}

struct Excluded {
    lexical: Utf8PathBuf,
    canonical: Option<Utf8PathBuf>,
}

impl Excluded {
    fn new(dir: &Utf8Path) -> Self {
        Excluded {
            lexical: lexical(dir),
            canonical: dir.canonicalize_utf8().ok(),
        }
    }

    fn contains(&self, path: &Utf8Path) -> bool {
        if lexical(path).starts_with(&self.lexical) {
            return true;
        }
        match (&self.canonical, path.canonicalize_utf8()) {
            (Some(dir), Ok(path)) => path.starts_with(dir),
            _ => false,
        }
    }
}

fn lexical(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect()
}
