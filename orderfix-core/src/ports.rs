//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use orderfix_edit::WriteOutcome;
use orderfix_snapshots::LoadedSnapshot;

/// Source of container snapshots.
pub trait SnapshotSource {
    fn load_snapshots(&self) -> anyhow::Result<Vec<LoadedSnapshot>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;

    /// Overwrite an input file only if it still hashes to `expected_sha256`.
    fn replace_if_unchanged(
        &self,
        path: &Utf8Path,
        expected_sha256: &str,
        contents: &str,
    ) -> anyhow::Result<WriteOutcome>;
}
