//! Library half of the `orderfix` binary: `orderfix.toml` handling and rule explanations.

pub mod config;
pub mod explain;
