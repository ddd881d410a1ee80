use crate::blank_lines;
use crate::error::{RefusalReason, RewriteError, RewriteResult};
use crate::regions::{self, Move, SoleMemberRegions};
use anyhow::anyhow;
use orderfix_decor::DecorationIndex;
use orderfix_types::container::{Container, DeclId};
use orderfix_types::violation::{Anchor, Placement, Subject, Violation};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOptions {
    #[serde(default)]
    pub sole_member_regions: SoleMemberRegions,
}

/// Relocate the violation's subject. Any refusal yields the container unchanged.
pub fn rewrite(container: &Container, violation: &Violation, options: &RewriteOptions) -> Container {
    match try_rewrite(container, violation, options) {
        Ok(next) => next,
        Err(err) => {
            debug!(
                rule = %violation.rule_id,
                container = %container.name,
                subject = %violation.subject_label,
                error = %err,
                "rewrite skipped; container unchanged"
            );
            container.clone()
        }
    }
}

/// Relocate the violation's subject, reporting why a move was refused.
pub fn try_rewrite(
    container: &Container,
    violation: &Violation,
    options: &RewriteOptions,
) -> RewriteResult<Container> {
    if !violation.fix.is_available() {
        return Err(RefusalReason::CrossFile.into());
    }

    match &violation.subject {
        Subject::BaseType { index, name } => {
            move_base_type(container, *index, name, &violation.placement.anchor)
        }
        Subject::Member { id } => move_member(container, *id, &violation.placement, options),
    }
}

fn move_base_type(
    container: &Container,
    index: usize,
    name: &str,
    anchor: &Anchor,
) -> RewriteResult<Container> {
    let Anchor::BaseListIndex(slot) = *anchor else {
        return Err(RefusalReason::NotMovable.into());
    };
    if container.base_list.get(index).map(|b| b.name.as_str()) != Some(name) {
        return Err(RefusalReason::TargetMissing.into());
    }
    if slot >= container.base_list.len() {
        return Err(RefusalReason::AnchorMissing.into());
    }

    let mut bases = container.base_list.clone();
    let moved = bases.remove(index);
    bases.insert(slot, moved);
    trace!(container = %container.name, from = index, to = slot, "moved base type");
    Ok(container.with_base_list(bases))
}

fn move_member(
    container: &Container,
    id: DeclId,
    placement: &Placement,
    options: &RewriteOptions,
) -> RewriteResult<Container> {
    let from = container
        .position(id)
        .ok_or(RefusalReason::TargetMissing)?;
    let subject = container
        .decl(id)
        .ok_or_else(|| anyhow!("declaration {id} is in the sibling list but not the arena"))?;

    let anchor_id = match placement.anchor {
        Anchor::Before(a) | Anchor::After(a) if a == id => {
            return Err(RefusalReason::NotMovable.into());
        }
        Anchor::Before(a) | Anchor::After(a) => Some(a),
        Anchor::Start | Anchor::End => None,
        Anchor::BaseListIndex(_) => return Err(RefusalReason::NotMovable.into()),
    };
    let anchor_pos = match anchor_id {
        Some(a) => Some(container.position(a).ok_or(RefusalReason::AnchorMissing)?),
        None => None,
    };

    let home = &container.location.file;
    let anchor_foreign = anchor_id
        .and_then(|a| container.decl(a))
        .is_some_and(|d| &d.location.file != home);
    if &subject.location.file != home || anchor_foreign {
        return Err(RefusalReason::CrossFile.into());
    }

    let gap = |pos: usize| pos - usize::from(pos > from);
    let to = match (placement.anchor, anchor_pos) {
        (Anchor::Before(_), Some(p)) => gap(p),
        (Anchor::After(_), Some(p)) => gap(p) + 1,
        (Anchor::End, _) => container.len() - 1,
        _ => 0,
    };
    if to == from {
        return Ok(container.clone());
    }

    let index = DecorationIndex::build(container);
    if index.touches_unbalanced(from.min(to), from.max(to)) {
        return Err(RefusalReason::UnbalancedRegion.into());
    }

    let mv = Move {
        from,
        to,
        anchor: anchor_pos,
        grouped: placement.grouped,
    };
    let ranges = regions::collapse(regions::relocate(index.regions(), &mv, options));

    let mut siblings = container.siblings().to_vec();
    let moved = blank_lines::detach(&mut siblings, from);
    blank_lines::attach(&mut siblings, moved, to);
    regions::materialize(&mut siblings, &ranges, &index);
    blank_lines::separate_markers(container.siblings(), &mut siblings);

    let next = container.with_siblings(siblings);
    verify(&index, &next, &ranges)?;

    trace!(
        container = %container.name,
        subject = %subject.signature(),
        from,
        to,
        "moved declaration"
    );
    Ok(next)
}

/// The rebuilt index must pair markers exactly as planned.
fn verify(
    before: &DecorationIndex<'_>,
    next: &Container,
    planned: &[regions::Range],
) -> RewriteResult<()> {
    let after = DecorationIndex::build(next);

    let expected = regions::footprint(planned.iter().map(|r| (r.start, r.end, r.label.as_str())));
    let actual = regions::footprint(
        after
            .regions()
            .iter()
            .map(|r| (r.start, r.end, r.label.as_str())),
    );
    if expected != actual || after.unbalanced().len() != before.unbalanced().len() {
        debug!(
            container = %next.name,
            planned = expected.len(),
            rebuilt = actual.len(),
            "region verification failed"
        );
        return Err(RefusalReason::WouldUnbalance.into());
    }
    Ok(())
}
