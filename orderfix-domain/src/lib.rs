//! Domain logic: ordering policies and the violation detector.
//!
//! This crate owns *what* is out of order and where it belongs. It does not own *how*
//! declarations are moved; that's the `orderfix-edit` crate.

mod detector;
mod order;
mod policies;
mod policy;
mod registry;

pub use detector::{UNBALANCED_REGION_RULE, detect, detect_all, diagnose};
pub use order::{overload_key, tie_break};
pub use policies::is_test_class;
pub use policy::{Compatibility, Expected, Misplacement, OrderingPolicy, PolicyConfig, PolicyMeta};
pub use registry::{PolicyRegistry, builtin_policy_metas, glob_match};
