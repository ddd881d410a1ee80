//! Shared ordering machinery: tie-break chains and minimal-move subject selection.

use crate::policy::Misplacement;
use orderfix_types::container::{Container, DeclId};
use orderfix_types::model::Declaration;
use orderfix_types::violation::{Anchor, Placement, Subject};
use std::cmp::Ordering;

/// Overload tie-break chain: accessibility, static before instance, variadic last, then
/// ascending parameter count. Source position closes the chain so the order is total.
pub fn overload_key(decl: &Declaration, position: usize) -> (u8, bool, bool, usize, usize) {
    (
        decl.accessibility.rank(),
        !decl.is_static,
        decl.is_variadic(),
        decl.params().len(),
        position,
    )
}

/// Compare two declarations with the overload tie-break chain.
pub fn tie_break(a: (&Declaration, usize), b: (&Declaration, usize)) -> Ordering {
    overload_key(a.0, a.1).cmp(&overload_key(b.0, b.1))
}

/// Sort `(position, id)` pairs by a key, keeping source order for equal keys.
pub(crate) fn canonical<K: Ord>(
    container: &Container,
    mut members: Vec<(usize, DeclId)>,
    key: impl Fn(&Declaration, usize) -> K,
) -> Vec<DeclId> {
    members.sort_by_key(|(pos, id)| {
        let k = container.decl(*id).map(|d| key(d, *pos));
        (k, *pos)
    });
    members.into_iter().map(|(_, id)| id).collect()
}

pub(crate) fn signatures(container: &Container, ids: &[DeclId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| container.decl(*id))
        .map(Declaration::signature)
        .collect()
}

/// Longest strictly increasing subsequence of `seq`, as indices, preferring the
/// lexicographically smallest index sequence among those of maximal length.
pub(crate) fn stable_subsequence(seq: &[usize]) -> Vec<usize> {
    pinned_subsequence(seq, &vec![false; seq.len()])
}

/// Strictly increasing subsequence of `seq` that keeps as many `pinned` entries as possible,
/// then is as long as possible, then takes the earliest indices.
pub(crate) fn pinned_subsequence(seq: &[usize], pinned: &[bool]) -> Vec<usize> {
    let n = seq.len();
    let weight = |i: usize| (usize::from(pinned.get(i).copied().unwrap_or(false)), 1usize);
    // best[i]: (pins, length) of the best increasing run starting at i.
    let mut best: Vec<(usize, usize)> = (0..n).map(weight).collect();
    for i in (0..n).rev() {
        for j in i + 1..n {
            if seq[j] > seq[i] {
                let (pins, len) = weight(i);
                let candidate = (pins + best[j].0, len + best[j].1);
                best[i] = best[i].max(candidate);
            }
        }
    }

    let Some(&top) = best.iter().max() else {
        return Vec::new();
    };

    let mut picked = Vec::with_capacity(top.1);
    let mut need = top;
    let mut floor: Option<usize> = None;
    for i in 0..n {
        if need.1 == 0 {
            break;
        }
        let above = floor.is_none_or(|f| seq[i] > f);
        if above && best[i] == need {
            picked.push(i);
            floor = Some(seq[i]);
            let (pins, len) = weight(i);
            need = (need.0 - pins, need.1 - len);
        }
    }
    picked
}

/// First declaration of `group` (given in canonical order) whose relative position is
/// incompatible with the canonical order.
///
/// The declarations forming the longest in-order subsequence stay put. The first
/// declaration outside it moves after its nearest in-place canonical predecessor, or before
/// its nearest in-place successor when it has none.
pub(crate) fn first_misplaced(
    container: &Container,
    group: &[DeclId],
    grouped: bool,
) -> Option<Misplacement> {
    first_misplaced_pinned(container, group, grouped, |_| false)
}

/// Like [`first_misplaced`], but declarations matching `pinned` are kept in place whenever
/// some in-order subsequence can hold them, even at the cost of extra moves.
pub(crate) fn first_misplaced_pinned(
    container: &Container,
    group: &[DeclId],
    grouped: bool,
    pinned: impl Fn(&Declaration) -> bool,
) -> Option<Misplacement> {
    if group.len() < 2 {
        return None;
    }

    // (position, rank, id) in current sibling order.
    let mut actual: Vec<(usize, usize, DeclId)> = group
        .iter()
        .enumerate()
        .filter_map(|(rank, id)| container.position(*id).map(|pos| (pos, rank, *id)))
        .collect();
    actual.sort_by_key(|(pos, _, _)| *pos);

    let ranks: Vec<usize> = actual.iter().map(|(_, rank, _)| *rank).collect();
    let pins: Vec<bool> = actual
        .iter()
        .map(|(_, _, id)| container.decl(*id).is_some_and(&pinned))
        .collect();
    let keep = pinned_subsequence(&ranks, &pins);
    if keep.len() == ranks.len() {
        return None;
    }

    let subject_idx = (0..ranks.len()).find(|i| !keep.contains(i))?;
    let (_, subject_rank, subject) = actual[subject_idx];

    let predecessor = keep
        .iter()
        .rev()
        .map(|&i| actual[i])
        .find(|(_, rank, _)| *rank < subject_rank);
    let anchor = match predecessor {
        Some((_, _, id)) => Anchor::After(id),
        None => {
            let (_, _, id) = keep
                .iter()
                .map(|&i| actual[i])
                .find(|(_, rank, _)| *rank > subject_rank)?;
            Anchor::Before(id)
        }
    };

    Some(Misplacement {
        subject: Subject::Member { id: subject },
        placement: Placement { anchor, grouped },
        expected: signatures(container, group),
    })
}

/// First base-list slot whose entry differs from the canonical order.
pub(crate) fn first_misplaced_base(container: &Container, order: &[usize]) -> Option<Misplacement> {
    let slot = order.iter().enumerate().position(|(i, idx)| i != *idx)?;
    let index = order[slot];
    let base = container.base_list.get(index)?;

    Some(Misplacement {
        subject: Subject::BaseType {
            index,
            name: base.name.clone(),
        },
        placement: Placement {
            anchor: Anchor::BaseListIndex(slot),
            grouped: false,
        },
        expected: order
            .iter()
            .filter_map(|i| container.base_list.get(*i))
            .map(|b| b.name.clone())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderfix_types::container::ContainerKind;
    use orderfix_types::decor::Decoration;
    use orderfix_types::model::{Accessibility, DeclKind, Location, Param};

    fn method(name: &str, params: &[&str]) -> Declaration {
        Declaration::new(
            name,
            DeclKind::Method {
                params: params
                    .iter()
                    .map(|t| Param {
                        name: String::new(),
                        type_name: (*t).to_string(),
                        variadic: false,
                    })
                    .collect(),
            },
        )
    }

    #[test]
    fn subsequence_prefers_earliest_indices() {
        assert_eq!(stable_subsequence(&[1, 0, 2]), vec![0, 2]);
        assert_eq!(stable_subsequence(&[0, 1, 2]), vec![0, 1, 2]);
        assert_eq!(stable_subsequence(&[2, 1, 0]), vec![0]);
        assert_eq!(stable_subsequence(&[3, 0, 1, 2]), vec![1, 2, 3]);
        assert!(stable_subsequence(&[]).is_empty());
    }

    #[test]
    fn pinned_entries_win_ties_and_length() {
        // Two runs of length one; the pinned entry is kept.
        assert_eq!(pinned_subsequence(&[1, 0], &[false, true]), vec![1]);
        assert_eq!(pinned_subsequence(&[1, 0], &[false, false]), vec![0]);
        // Keeping the pinned entry beats a longer run without it.
        assert_eq!(pinned_subsequence(&[1, 2, 0], &[false, false, true]), vec![2]);
        assert_eq!(pinned_subsequence(&[0, 2, 1], &[false, false, true]), vec![0, 2]);
    }

    #[test]
    fn pinned_member_stays_and_the_other_moves() {
        let mut c = Container::new("Foo", ContainerKind::Class, Location::default());
        let with_flag = c.push(method("Dispose", &["bool"]), Decoration::default());
        let plain = c.push(method("Dispose", &[]), Decoration::default());

        let m = first_misplaced_pinned(&c, &[plain, with_flag], true, |d| d.params().is_empty())
            .unwrap();
        assert_eq!(m.subject, Subject::Member { id: with_flag });
        assert_eq!(m.placement.anchor, Anchor::After(plain));
    }

    #[test]
    fn tie_break_chain_orders_accessibility_then_static() {
        let public = method("Foo", &["int"]).with_accessibility(Accessibility::Public);
        let private_static = method("Foo", &[]).with_static(true);
        let private = method("Foo", &[]);
        assert_eq!(tie_break((&public, 2), (&private_static, 0)), Ordering::Less);
        assert_eq!(tie_break((&private_static, 1), (&private, 0)), Ordering::Less);
    }

    #[test]
    fn tie_break_is_total_through_position() {
        let a = method("Foo", &["int"]);
        let b = method("Foo", &["string"]);
        assert_eq!(tie_break((&a, 0), (&b, 1)), Ordering::Less);
        assert_eq!(tie_break((&b, 1), (&a, 0)), Ordering::Greater);
    }

    #[test]
    fn equal_arity_overloads_fall_through_to_position() {
        let by_string = method("Foo", &["string"]);
        let by_int = method("Foo", &["int"]);
        assert_eq!(tie_break((&by_string, 0), (&by_int, 1)), Ordering::Less);
        assert_eq!(overload_key(&by_string, 0), overload_key(&by_int, 0));
    }

    #[test]
    fn misplaced_member_anchors_before_successor() {
        let mut c = Container::new("Foo", ContainerKind::Class, Location::default());
        let one = c.push(method("Foo", &["int"]), Decoration::default());
        let zero = c.push(method("Foo", &[]), Decoration::default());
        let two = c.push(method("Foo", &["string", "int"]), Decoration::default());

        let m = first_misplaced(&c, &[zero, one, two], true).unwrap();
        assert_eq!(m.subject, Subject::Member { id: zero });
        assert_eq!(m.placement.anchor, Anchor::Before(one));
        assert!(m.placement.grouped);
        assert_eq!(m.expected, vec!["Foo()", "Foo(int)", "Foo(string, int)"]);
    }

    #[test]
    fn misplaced_member_anchors_after_predecessor() {
        let mut c = Container::new("Foo", ContainerKind::Class, Location::default());
        let a = c.push(method("A", &[]), Decoration::default());
        let b = c.push(method("B", &[]), Decoration::default());
        let z = c.push(method("Z", &[]), Decoration::default());

        // Canonical order a, z, b: keep a and b, move z after a.
        let m = first_misplaced(&c, &[a, z, b], false).unwrap();
        assert_eq!(m.subject, Subject::Member { id: z });
        assert_eq!(m.placement.anchor, Anchor::After(a));
    }

    #[test]
    fn in_order_group_is_compatible() {
        let mut c = Container::new("Foo", ContainerKind::Class, Location::default());
        let a = c.push(method("A", &[]), Decoration::default());
        let b = c.push(method("B", &[]), Decoration::default());
        assert!(first_misplaced(&c, &[a, b], false).is_none());
        assert!(first_misplaced(&c, &[a], false).is_none());
    }
}
