//! Decoration index: per-container view of doc comments, blank lines and region markers.
//!
//! [`DecorationIndex::build`] scans sibling decoration left to right with a stack of open
//! markers. A close pops the innermost open and records the covered range
//! `[open position, close position]`. Opens left on the stack and closes found with an empty
//! stack are *unbalanced*; they are reported separately and no declaration in their affected
//! range may be moved.

use orderfix_types::container::{Container, DeclId};
use orderfix_types::decor::Decoration;
use std::ops::RangeInclusive;
use tracing::trace;

/// A balanced region and the sibling positions it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSpan {
    pub label: String,
    pub close_label: Option<String>,
    pub start: usize,
    pub end: usize,

    /// Number of balanced regions enclosing this one.
    pub depth: usize,
    pub continued: bool,
}

impl RegionSpan {
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Open and close sit on the same declaration.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn encloses(&self, other: &RegionSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerHalf {
    Open,
    Close,
}

/// A marker half with no partner in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbalancedMarker {
    pub position: usize,
    pub host: DeclId,
    pub half: MarkerHalf,
    pub label: Option<String>,
}

impl UnbalancedMarker {
    /// Positions whose folding depends on this marker: everything after a stray open, everything
    /// before a stray close.
    pub fn affected(&self, len: usize) -> RangeInclusive<usize> {
        match self.half {
            MarkerHalf::Open => self.position..=len.saturating_sub(1),
            MarkerHalf::Close => 0..=self.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecorationIndex<'a> {
    container: &'a Container,
    regions: Vec<RegionSpan>,
    unbalanced: Vec<UnbalancedMarker>,
}

struct OpenEntry {
    position: usize,
    label: String,
    continued: bool,
    seq: usize,
}

struct Closed {
    span: RegionSpan,
    open_seq: usize,
    close_seq: usize,
}

impl<'a> DecorationIndex<'a> {
    pub fn build(container: &'a Container) -> Self {
        let mut stack: Vec<OpenEntry> = Vec::new();
        let mut closed: Vec<Closed> = Vec::new();
        let mut unbalanced = Vec::new();
        let mut open_seq = 0usize;
        let mut close_seq = 0usize;

        for (pos, sibling) in container.siblings().iter().enumerate() {
            for open in &sibling.decor.region_opens {
                stack.push(OpenEntry {
                    position: pos,
                    label: open.label.clone(),
                    continued: open.continued,
                    seq: open_seq,
                });
                open_seq += 1;
            }

            for close in &sibling.decor.region_closes {
                match stack.pop() {
                    Some(open) => {
                        closed.push(Closed {
                            span: RegionSpan {
                                label: open.label,
                                close_label: close.label.clone(),
                                start: open.position,
                                end: pos,
                                depth: 0,
                                continued: open.continued,
                            },
                            open_seq: open.seq,
                            close_seq,
                        });
                    }
                    None => unbalanced.push(UnbalancedMarker {
                        position: pos,
                        host: sibling.id,
                        half: MarkerHalf::Close,
                        label: close.label.clone(),
                    }),
                }
                close_seq += 1;
            }
        }

        for open in stack {
            let host = container.siblings()[open.position].id;
            unbalanced.push(UnbalancedMarker {
                position: open.position,
                host,
                half: MarkerHalf::Open,
                label: Some(open.label),
            });
        }
        unbalanced.sort_by_key(|m| (m.position, m.half == MarkerHalf::Close));

        let mut regions: Vec<RegionSpan> = closed
            .iter()
            .map(|c| {
                let depth = closed
                    .iter()
                    .filter(|o| o.open_seq < c.open_seq && o.close_seq > c.close_seq)
                    .count();
                RegionSpan {
                    depth,
                    ..c.span.clone()
                }
            })
            .collect();
        regions.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a.depth.cmp(&b.depth))
        });

        trace!(
            container = %container.name,
            regions = regions.len(),
            unbalanced = unbalanced.len(),
            "built decoration index"
        );

        Self {
            container,
            regions,
            unbalanced,
        }
    }

    pub fn container(&self) -> &'a Container {
        self.container
    }

    pub fn decoration(&self, id: DeclId) -> Option<&'a Decoration> {
        self.container.decoration(id)
    }

    /// Balanced regions ordered by start, outermost first.
    pub fn regions(&self) -> &[RegionSpan] {
        &self.regions
    }

    pub fn unbalanced(&self) -> &[UnbalancedMarker] {
        &self.unbalanced
    }

    pub fn is_balanced(&self) -> bool {
        self.unbalanced.is_empty()
    }

    pub fn regions_covering(&self, pos: usize) -> impl Iterator<Item = &RegionSpan> {
        self.regions.iter().filter(move |r| r.contains(pos))
    }

    pub fn innermost_region(&self, pos: usize) -> Option<&RegionSpan> {
        self.regions_covering(pos).max_by_key(|r| r.depth)
    }

    /// Whether any unbalanced marker's affected range intersects `lo..=hi`.
    pub fn touches_unbalanced(&self, lo: usize, hi: usize) -> bool {
        let len = self.container.len();
        self.unbalanced.iter().any(|m| {
            let affected = m.affected(len);
            *affected.start() <= hi && lo <= *affected.end()
        })
    }

    /// Total open and close marker halves in the container.
    pub fn marker_counts(&self) -> (usize, usize) {
        self.container
            .siblings()
            .iter()
            .fold((0, 0), |(opens, closes), s| {
                (
                    opens + s.decor.region_opens.len(),
                    closes + s.decor.region_closes.len(),
                )
            })
    }
}
