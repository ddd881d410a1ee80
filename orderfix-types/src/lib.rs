//! Shared DTOs (schemas-as-code) for the orderfix workspace.
//!
//! # Design constraints
//! - Declarations are immutable once loaded; rewrites produce new [`container::Container`] values.
//! - Wire types under [`wire`] are what gets serialized to disk.
//! - Prefer adding optional fields over changing semantics.

pub mod container;
pub mod decor;
pub mod model;
pub mod report;
pub mod snapshot;
pub mod violation;
pub mod wire;

/// Schema identifiers.
pub mod schema {
    pub const ORDERFIX_SNAPSHOT_V1: &str = "orderfix.snapshot.v1";
    pub const ORDERFIX_REPORT_V1: &str = "orderfix.report.v1";
}
