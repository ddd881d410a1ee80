//! Snapshot ingestion utilities.
//!
//! The host exports one `orderfix.snapshot.v1` document per source file. Loading is tolerant: a
//! file that fails to parse is reported alongside the good ones instead of aborting the run.

mod format;
mod load;

pub use format::{SnapshotFormat, parse_snapshot, serialize_snapshot, sha256_hex};
pub use load::{LoadedSnapshot, SnapshotLoadError, load_snapshots, load_snapshots_excluding};
