use super::dispose;
use crate::order::{self, overload_key};
use crate::policy::{Compatibility, Expected, Misplacement, OrderingPolicy, PolicyMeta};
use orderfix_types::container::{Container, DeclId};
use orderfix_types::model::Declaration;
use orderfix_types::violation::{Anchor, Placement, Subject};
use std::collections::BTreeMap;

/// Overloads are contiguous and sorted by the tie-break chain.
pub struct OverloadsSorted;

/// Overloads stay within a fixed distance of each other, in any order.
pub struct OverloadsAdjacent {
    meta: PolicyMeta,
    threshold: usize,
}

impl OverloadsSorted {
    const META: PolicyMeta = PolicyMeta {
        id: "order.overloads_sorted",
        key: "overloads-sorted",
        title: "Overloads are contiguous and sorted",
        compatibility: Compatibility::Strict,
        grouped: true,
    };
}

impl OverloadsAdjacent {
    pub fn new(threshold: usize) -> Self {
        Self {
            meta: PolicyMeta {
                id: "order.overloads_adjacent",
                key: "overloads-adjacent",
                title: "Overloads are side by side",
                compatibility: Compatibility::Proximity,
                grouped: true,
            },
            threshold: threshold.max(1),
        }
    }
}

fn participates(decl: &Declaration) -> bool {
    (decl.is_method() || decl.is_constructor())
        && !decl.symbol.is_override
        && decl.symbol.explicit_interface.is_none()
}

/// Same-named methods (and constructors), two or more per group, groups ordered by their first
/// member. Members are in source order.
fn overload_groups(container: &Container) -> Vec<Vec<(usize, DeclId)>> {
    let mut by_name: BTreeMap<(bool, &str), Vec<(usize, DeclId)>> = BTreeMap::new();
    for (pos, id, decl) in container.members() {
        if participates(decl) {
            by_name
                .entry((decl.is_constructor(), decl.name.as_str()))
                .or_default()
                .push((pos, id));
        }
    }

    let mut groups: Vec<_> = by_name.into_values().filter(|g| g.len() > 1).collect();
    groups.sort_by_key(|g| g[0].0);
    groups
}

/// Members are pinned when Dispose placement owns their position.
fn pinned(decl: &Declaration) -> bool {
    dispose::qualifies(decl)
}

/// First pair of consecutive members further apart than `threshold` positions.
fn first_gap(
    container: &Container,
    members: &[DeclId],
    threshold: usize,
) -> Option<(DeclId, DeclId)> {
    members.windows(2).find_map(|pair| {
        let prev = container.position(pair[0])?;
        let cur = container.position(pair[1])?;
        (cur.abs_diff(prev) > threshold).then_some((pair[0], pair[1]))
    })
}

/// Close the gap between `prev` and `next`: `next` moves after `prev`, unless `next` is pinned,
/// in which case `prev` moves before it.
fn join(container: &Container, group: &[DeclId], prev: DeclId, next: DeclId) -> Misplacement {
    let next_pinned = container.decl(next).is_some_and(pinned);
    let (subject, anchor) = if next_pinned {
        (prev, Anchor::Before(next))
    } else {
        (next, Anchor::After(prev))
    };
    Misplacement {
        subject: Subject::Member { id: subject },
        placement: Placement {
            anchor,
            grouped: true,
        },
        expected: order::signatures(container, group),
    }
}

impl OrderingPolicy for OverloadsSorted {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn expected_order(&self, container: &Container) -> Expected {
        Expected::Members(
            overload_groups(container)
                .into_iter()
                .map(|g| order::canonical(container, g, overload_key))
                .collect(),
        )
    }

    fn locate(&self, container: &Container, expected: &Expected) -> Option<Misplacement> {
        let Expected::Members(groups) = expected else {
            return None;
        };
        groups.iter().find_map(|group| {
            order::first_misplaced_pinned(container, group, true, pinned).or_else(|| {
                first_gap(container, group, 1).map(|(prev, next)| join(container, group, prev, next))
            })
        })
    }
}

impl OrderingPolicy for OverloadsAdjacent {
    fn meta(&self) -> &PolicyMeta {
        &self.meta
    }

    fn expected_order(&self, container: &Container) -> Expected {
        Expected::Members(
            overload_groups(container)
                .into_iter()
                .map(|g| g.into_iter().map(|(_, id)| id).collect())
                .collect(),
        )
    }

    fn locate(&self, container: &Container, expected: &Expected) -> Option<Misplacement> {
        let Expected::Members(groups) = expected else {
            return None;
        };
        groups.iter().find_map(|group| {
            first_gap(container, group, self.threshold)
                .map(|(prev, next)| join(container, group, prev, next))
        })
    }
}
