//! Detector output: what is out of place and where it belongs.

use crate::container::DeclId;
use crate::model::Location;
use serde::{Deserialize, Serialize};

/// The item a violation asks to relocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    Member { id: DeclId },
    BaseType { index: usize, name: String },
}

/// Insertion point, resolved against the snapshot the rewriter receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Anchor {
    Start,
    End,
    Before(DeclId),
    After(DeclId),
    BaseListIndex(usize),
}

impl Anchor {
    pub fn decl(&self) -> Option<DeclId> {
        match self {
            Anchor::Before(id) | Anchor::After(id) => Some(*id),
            Anchor::Start | Anchor::End | Anchor::BaseListIndex(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub anchor: Anchor,

    /// The policy groups the moved declaration with its anchor, so regions around the anchor
    /// grow to cover it.
    #[serde(default)]
    pub grouped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FixAvailability {
    Available,
    Unavailable { reason: String },
}

impl FixAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, FixAvailability::Available)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Deterministic id (uuid v5 over rule, container and subject).
    pub id: String,
    pub rule_id: String,
    pub container: String,
    pub subject: Subject,

    /// Rendered signature of the subject.
    pub subject_label: String,

    /// Competing declarations rendered in canonical order.
    pub expected_order: Vec<String>,
    pub placement: Placement,
    pub fix: FixAvailability,
    pub location: Location,
    pub message: String,
}

impl Violation {
    pub fn member(&self) -> Option<DeclId> {
        match self.subject {
            Subject::Member { id } => Some(id),
            Subject::BaseType { .. } => None,
        }
    }
}
