use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use orderfix_snapshots::sha256_hex;

/// Result of a guarded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
    /// The file changed since it was read; nothing was written.
    Stale { expected: String, actual: String },
}

/// Overwrite `path` with `contents` only if its current sha256 is `expected_sha256`.
pub fn write_if_unchanged(
    path: &Utf8Path,
    expected_sha256: &str,
    contents: &str,
) -> anyhow::Result<WriteOutcome> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path))?;
    let actual = sha256_hex(&bytes);
    if actual != expected_sha256 {
        return Ok(WriteOutcome::Stale {
            expected: expected_sha256.to_string(),
            actual,
        });
    }
    if bytes == contents.as_bytes() {
        return Ok(WriteOutcome::Unchanged);
    }

    fs::write(path, contents).with_context(|| format!("write {}", path))?;
    Ok(WriteOutcome::Written)
}
