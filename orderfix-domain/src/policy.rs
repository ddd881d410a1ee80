use crate::order;
use orderfix_types::container::{Container, DeclId};
use orderfix_types::violation::{Placement, Subject};
use serde::Serialize;

/// How strictly actual order must match expected order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    /// Relative order must match exactly.
    Strict,
    /// Members only need to stay within a fixed distance of each other.
    Proximity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyMeta {
    /// Stable rule id (`order.*`).
    pub id: &'static str,
    /// Short user-facing key (e.g. `overloads-sorted`).
    pub key: &'static str,
    pub title: &'static str,
    pub compatibility: Compatibility,
    /// Moved declarations join regions around their anchor.
    pub grouped: bool,
}

/// Canonical relative order computed by a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// Independent groups of declarations, each in canonical order.
    Members(Vec<Vec<DeclId>>),
    /// Base-list indices in canonical order.
    BaseList(Vec<usize>),
}

/// First incompatible item and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misplacement {
    pub subject: Subject,
    pub placement: Placement,
    /// Competing items rendered in canonical order.
    pub expected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Largest allowed position distance between neighbouring overloads.
    pub proximity_threshold: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 1,
        }
    }
}

/// A stateless, container-scoped ordering rule. Policies never look at decoration.
pub trait OrderingPolicy: Send + Sync {
    fn meta(&self) -> &PolicyMeta;

    fn applies_to(&self, _container: &Container) -> bool {
        true
    }

    fn expected_order(&self, container: &Container) -> Expected;

    fn locate(&self, container: &Container, expected: &Expected) -> Option<Misplacement> {
        match expected {
            Expected::Members(groups) => groups
                .iter()
                .find_map(|g| order::first_misplaced(container, g, self.meta().grouped)),
            Expected::BaseList(indices) => order::first_misplaced_base(container, indices),
        }
    }
}
