//! Structural rewriter for orderfix.
//!
//! Responsibilities:
//! - Relocate one declaration (or base-list entry) per call, keeping doc comments, blank lines
//!   and region markers consistent.
//! - Refuse moves that would leave markers unbalanced, returning the input unchanged.
//! - Render unified diffs and guard snapshot writes with sha256 preconditions.

mod blank_lines;
mod error;
mod patch;
mod preconditions;
mod regions;
mod rewriter;

pub use error::{RefusalReason, RewriteError, RewriteResult};
pub use orderfix_snapshots::sha256_hex;
pub use patch::render_patch;
pub use preconditions::{WriteOutcome, write_if_unchanged};
pub use regions::SoleMemberRegions;
pub use rewriter::{RewriteOptions, rewrite, try_rewrite};
