//! Embeddable core library for orderfix.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into an editor host or
//! any other process that already holds snapshots.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`SnapshotSource`](ports::SnapshotSource) loads container snapshots
//! - [`WritePort`](ports::WritePort) writes artifacts and guarded snapshot overwrites
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry points
//!
//! - [`run_check`](pipeline::run_check) diagnoses every container
//! - [`run_fix`](pipeline::run_fix) rewrites containers until they settle

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export snapshot types so embedders don't need orderfix-snapshots directly.
pub use orderfix_snapshots::{LoadedSnapshot, SnapshotFormat, SnapshotLoadError};
