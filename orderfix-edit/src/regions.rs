//! Region range algebra for a single move.
//!
//! Balanced regions are lifted out of the marker layer as ranges, transformed for the move,
//! collapsed where a split left two halves touching, and written back as markers.
//!
//! Coordinates: `from` is the subject's position before the move, `to` its position after.
//! Between the two the subject is absent, so every other declaration has a *gap* position
//! `p - (p > from)`.

use crate::RewriteOptions;
use orderfix_decor::{DecorationIndex, MarkerHalf, RegionSpan};
use orderfix_types::container::{DeclId, Sibling};
use orderfix_types::decor::{RegionClose, RegionOpen};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// What happens to a region whose only member is moved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoleMemberRegions {
    /// The region moves with its member.
    #[default]
    Travel,
    /// The region is deleted.
    Drop,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Move {
    pub from: usize,
    pub to: usize,
    /// Anchor position before the move, for `Before`/`After` anchors.
    pub anchor: Option<usize>,
    pub grouped: bool,
}

impl Move {
    fn gap(&self, pos: usize) -> usize {
        pos - usize::from(pos > self.from)
    }
}

/// A balanced region over final positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Range {
    pub label: String,
    pub close_label: Option<String>,
    pub start: usize,
    pub end: usize,
    pub continued: bool,
}

impl Range {
    fn span(r: &RegionSpan, start: usize, end: usize) -> Self {
        Range {
            label: r.label.clone(),
            close_label: r.close_label.clone(),
            start,
            end,
            continued: r.continued,
        }
    }

    fn laminar_with(&self, other: &Range) -> bool {
        let disjoint = self.end < other.start || other.end < self.start;
        let nested = (self.start <= other.start && other.end <= self.end)
            || (other.start <= self.start && self.end <= other.end);
        disjoint || nested
    }
}

/// Transform every balanced region of the index for `mv`. Output keeps index order, so equal
/// ranges stay outermost first.
pub(crate) fn relocate(regions: &[RegionSpan], mv: &Move, options: &RewriteOptions) -> Vec<Range> {
    let mut out = Vec::with_capacity(regions.len() + 1);
    let t = mv.to;

    for r in regions {
        let anchor_inside = mv.anchor.is_some_and(|a| r.contains(a));
        let was_member = r.contains(mv.from);

        if was_member && r.is_single() {
            match options.sole_member_regions {
                SoleMemberRegions::Travel => out.push(Range::span(r, t, t)),
                SoleMemberRegions::Drop => {}
            }
            continue;
        }

        // Remaining range without the subject.
        let (a, b) = if was_member {
            (r.start, r.end - 1)
        } else {
            (mv.gap(r.start), mv.gap(r.end))
        };

        let interior = a < t && t <= b;
        let boundary = t == a || t == b + 1;

        let join = if interior {
            was_member || mv.grouped
        } else {
            boundary && anchor_inside && (was_member || mv.grouped)
        };

        if join {
            out.push(Range::span(r, a, b + 1));
        } else if interior {
            let mut left = Range::span(r, a, t - 1);
            left.continued = r.continued;
            let mut right = Range::span(r, t + 1, b + 1);
            right.continued = true;
            out.push(left);
            out.push(right);
        } else if t <= a {
            out.push(Range::span(r, a + 1, b + 1));
        } else {
            out.push(Range::span(r, a, b));
        }
    }

    out
}

/// Merge the two halves of split regions back into one where nothing separates them.
pub(crate) fn collapse(mut ranges: Vec<Range>) -> Vec<Range> {
    while let Some((i, j, merged)) = next_merge(&ranges) {
        ranges[i] = merged;
        ranges.remove(j);
    }
    ranges
}

fn next_merge(ranges: &[Range]) -> Option<(usize, usize, Range)> {
    for (i, l) in ranges.iter().enumerate() {
        for (j, r) in ranges.iter().enumerate() {
            if i == j || !r.continued || l.end + 1 != r.start || l.label != r.label {
                continue;
            }
            let merged = Range {
                label: l.label.clone(),
                close_label: r.close_label.clone(),
                start: l.start,
                end: r.end,
                continued: l.continued,
            };
            let laminar = ranges
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i && *k != j)
                .all(|(_, other)| merged.laminar_with(other));
            if laminar {
                return Some((i, j, merged));
            }
        }
    }
    None
}

/// Rewrite every sibling's markers from `ranges`, keeping unbalanced halves on their hosts.
pub(crate) fn materialize(siblings: &mut [Sibling], ranges: &[Range], index: &DecorationIndex<'_>) {
    let mut stray: BTreeMap<DeclId, (usize, usize)> = BTreeMap::new();
    for m in index.unbalanced() {
        let entry = stray.entry(m.host).or_default();
        match m.half {
            MarkerHalf::Open => entry.0 += 1,
            MarkerHalf::Close => entry.1 += 1,
        }
    }

    for s in siblings.iter_mut() {
        let (opens, closes) = stray.get(&s.id).copied().unwrap_or_default();
        s.decor.region_opens.truncate(opens);
        let keep_from = s.decor.region_closes.len().saturating_sub(closes);
        s.decor.region_closes.drain(..keep_from);
    }

    let mut open_order: Vec<usize> = (0..ranges.len()).collect();
    open_order.sort_by_key(|&i| (ranges[i].start, Reverse(ranges[i].end)));
    let rank: BTreeMap<usize, usize> = open_order
        .iter()
        .enumerate()
        .map(|(rank, &i)| (i, rank))
        .collect();

    let mut close_order: Vec<usize> = (0..ranges.len()).collect();
    close_order.sort_by_key(|&i| {
        (
            ranges[i].end,
            Reverse(ranges[i].start),
            Reverse(rank.get(&i).copied().unwrap_or_default()),
        )
    });

    // Closes go in front of the stray suffix, so collect them first.
    let mut closes: BTreeMap<usize, Vec<RegionClose>> = BTreeMap::new();
    for &i in &close_order {
        let r = &ranges[i];
        closes.entry(r.end).or_default().push(RegionClose {
            label: r.close_label.clone(),
        });
    }

    for &i in &open_order {
        let r = &ranges[i];
        if let Some(host) = siblings.get_mut(r.start) {
            host.decor.region_opens.push(RegionOpen {
                label: r.label.clone(),
                continued: r.continued,
            });
        }
    }
    for (pos, mut list) in closes {
        if let Some(host) = siblings.get_mut(pos) {
            list.append(&mut host.decor.region_closes);
            host.decor.region_closes = list;
        }
    }
}

/// `(start, end, label)` triples in a canonical order, for comparing against a rebuilt index.
pub(crate) fn footprint<'a>(
    ranges: impl Iterator<Item = (usize, usize, &'a str)>,
) -> Vec<(usize, usize, String)> {
    let mut out: Vec<_> = ranges.map(|(s, e, l)| (s, e, l.to_string())).collect();
    out.sort();
    out
}
