use crate::policy::{Misplacement, OrderingPolicy};
use crate::registry::PolicyRegistry;
use orderfix_decor::{DecorationIndex, MarkerHalf};
use orderfix_types::container::Container;
use orderfix_types::model::Location;
use orderfix_types::report::{Diagnostic, ReportLocation, Severity};
use orderfix_types::violation::{Anchor, FixAvailability, Subject, Violation};
use tracing::{debug, trace};
use uuid::Uuid;

/// Rule id of the unbalanced-marker diagnostic reported by the decoration index.
pub const UNBALANCED_REGION_RULE: &str = "decor.unbalanced_region";

/// First violation of `policy` in `container`, if any.
///
/// Never fails: containers without members, or ones the policy does not apply to, yield `None`.
pub fn detect(container: &Container, policy: &dyn OrderingPolicy) -> Option<Violation> {
    let meta = policy.meta();
    if container.is_empty() {
        return None;
    }
    if !policy.applies_to(container) {
        debug!(policy = meta.id, container = %container.name, "policy does not apply");
        return None;
    }

    let expected = policy.expected_order(container);
    let found = policy.locate(container, &expected)?;
    trace!(policy = meta.id, container = %container.name, "violation located");
    Some(to_violation(container, meta.id, meta.title, found))
}

/// One violation per active policy at most, in registry order.
pub fn detect_all(container: &Container, registry: &PolicyRegistry) -> Vec<Violation> {
    registry.iter().filter_map(|p| detect(container, p)).collect()
}

/// Ordering violations (`warn`) followed by unbalanced region markers (`info`).
pub fn diagnose(container: &Container, registry: &PolicyRegistry) -> Vec<Diagnostic> {
    let mut out: Vec<Diagnostic> = detect_all(container, registry)
        .into_iter()
        .map(|v| Diagnostic {
            rule_id: v.rule_id,
            severity: Severity::Warn,
            container: v.container,
            message: v.message,
            location: ReportLocation::from(&v.location),
            fixable: v.fix.is_available(),
            expected_order: v.expected_order,
            fingerprint: Some(v.id),
        })
        .collect();

    let index = DecorationIndex::build(container);
    for marker in index.unbalanced() {
        let location = container
            .decl(marker.host)
            .map(|d| d.location.clone())
            .unwrap_or_else(|| container.location.clone());
        let half = match marker.half {
            MarkerHalf::Open => "#region",
            MarkerHalf::Close => "#endregion",
        };
        let label = marker
            .label
            .as_deref()
            .map(|l| format!(" \"{l}\""))
            .unwrap_or_default();
        out.push(Diagnostic {
            rule_id: UNBALANCED_REGION_RULE.to_string(),
            severity: Severity::Info,
            container: container.name.clone(),
            message: format!(
                "Unbalanced {half}{label}: no matching marker in `{}`; declarations it affects will not be moved",
                container.name
            ),
            location: ReportLocation::from(&location),
            fixable: false,
            expected_order: Vec::new(),
            fingerprint: Some(
                violation_id(
                    UNBALANCED_REGION_RULE,
                    container,
                    &format!("{half}@{}", marker.position),
                )
                .to_string(),
            ),
        });
    }

    out
}

fn to_violation(
    container: &Container,
    rule_id: &str,
    title: &str,
    found: Misplacement,
) -> Violation {
    let Misplacement {
        subject,
        placement,
        expected,
    } = found;

    let (subject_label, location) = match &subject {
        Subject::Member { id } => match container.decl(*id) {
            Some(d) => (d.signature(), d.location.clone()),
            None => (id.to_string(), container.location.clone()),
        },
        Subject::BaseType { name, .. } => (name.clone(), container.location.clone()),
    };

    let fix = fix_availability(container, &subject, &placement.anchor);
    let target = describe_anchor(container, &placement.anchor);
    let message = format!(
        "{title}: move `{subject_label}` {target}. Expected order: {}",
        expected.join(", ")
    );

    Violation {
        id: violation_id(rule_id, container, &subject_label).to_string(),
        rule_id: rule_id.to_string(),
        container: container.name.clone(),
        subject,
        subject_label,
        expected_order: expected,
        placement,
        fix,
        location,
        message,
    }
}

/// Moves are confined to the file that declares the container.
fn fix_availability(container: &Container, subject: &Subject, anchor: &Anchor) -> FixAvailability {
    let home = &container.location.file;
    let foreign = |loc: &Location| &loc.file != home;

    let subject_foreign = match subject {
        Subject::Member { id } => container.decl(*id).is_some_and(|d| foreign(&d.location)),
        Subject::BaseType { .. } => false,
    };
    let anchor_foreign = anchor
        .decl()
        .and_then(|id| container.decl(id))
        .is_some_and(|d| foreign(&d.location));

    if subject_foreign || anchor_foreign {
        FixAvailability::Unavailable {
            reason: "declarations span multiple files".to_string(),
        }
    } else {
        FixAvailability::Available
    }
}

fn describe_anchor(container: &Container, anchor: &Anchor) -> String {
    let sig = |id| {
        container
            .decl(id)
            .map(|d| d.signature())
            .unwrap_or_else(|| id.to_string())
    };
    match anchor {
        Anchor::Start => "to the start".to_string(),
        Anchor::End => "to the end".to_string(),
        Anchor::Before(id) => format!("before `{}`", sig(*id)),
        Anchor::After(id) => format!("after `{}`", sig(*id)),
        Anchor::BaseListIndex(0) => "to the front of the base list".to_string(),
        Anchor::BaseListIndex(i) => format!("to base list position {}", i + 1),
    }
}

fn violation_id(rule_id: &str, container: &Container, subject: &str) -> Uuid {
    const NAMESPACE: Uuid = Uuid::from_bytes([
        0x7a, 0x1e, 0x93, 0x0c, 0x5b, 0x42, 0x4f, 0x8d, 0xa6, 0x11, 0x2c, 0x90, 0xe4, 0x3b, 0x77,
        0x05,
    ]);

    let stable_key = format!(
        "{}|{}|{}|{}",
        rule_id, container.location.file, container.name, subject
    );
    Uuid::new_v5(&NAMESPACE, stable_key.as_bytes())
}
