//! Default filesystem-backed port implementations.

use crate::ports::{SnapshotSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use orderfix_edit::{WriteOutcome, write_if_unchanged};
use orderfix_snapshots::LoadedSnapshot;
use tracing::debug;

/// Loads snapshots from the filesystem via `orderfix_snapshots::load_snapshots_excluding`.
#[derive(Debug, Clone)]
pub struct FsSnapshotSource {
    pub snapshots_dir: Utf8PathBuf,
    /// Skipped while scanning; the report directory.
    pub excluded_dir: Option<Utf8PathBuf>,
}

impl FsSnapshotSource {
    pub fn new(snapshots_dir: Utf8PathBuf) -> Self {
        Self {
            snapshots_dir,
            excluded_dir: None,
        }
    }

    pub fn excluding(mut self, dir: Utf8PathBuf) -> Self {
        self.excluded_dir = Some(dir);
        self
    }
}

impl SnapshotSource for FsSnapshotSource {
    fn load_snapshots(&self) -> anyhow::Result<Vec<LoadedSnapshot>> {
        orderfix_snapshots::load_snapshots_excluding(
            &self.snapshots_dir,
            self.excluded_dir.as_deref(),
        )
        .with_context(|| format!("load snapshots from {}", self.snapshots_dir))
    }
}

/// In-memory snapshot source for embedding and testing.
///
/// Drops anything under `artifacts/orderfix/`, like the fs loader, and sorts by path on
/// construction to match `FsSnapshotSource`'s ordering.
#[derive(Debug, Clone)]
pub struct InMemorySnapshotSource {
    snapshots: Vec<LoadedSnapshot>,
}

impl InMemorySnapshotSource {
    pub fn new(mut snapshots: Vec<LoadedSnapshot>) -> Self {
        snapshots.retain(|s| {
            let p = s.path.as_str().replace('\\', "/").to_ascii_lowercase();
            let own = p.starts_with("artifacts/orderfix/") || p.contains("/artifacts/orderfix/");
            if own {
                debug!(path = s.path.as_str(), "skipping orderfix output");
            }
            !own
        });
        snapshots.sort_by(|a, b| a.path.cmp(&b.path));
        Self { snapshots }
    }
}

impl SnapshotSource for InMemorySnapshotSource {
    fn load_snapshots(&self) -> anyhow::Result<Vec<LoadedSnapshot>> {
        Ok(self.snapshots.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }

    fn replace_if_unchanged(
        &self,
        path: &Utf8Path,
        expected_sha256: &str,
        contents: &str,
    ) -> anyhow::Result<WriteOutcome> {
        write_if_unchanged(path, expected_sha256, contents)
    }
}
