use crate::order;
use crate::policy::{Compatibility, Expected, Misplacement, OrderingPolicy, PolicyMeta};
use orderfix_types::container::{Container, DeclId};
use orderfix_types::model::{Accessibility, DeclKind, Declaration};
use orderfix_types::violation::{Anchor, Placement, Subject};

/// `Dispose()` follows constructors and finalizers and precedes the other instance methods of
/// its accessibility bracket.
pub struct DisposePlacement;

impl DisposePlacement {
    const META: PolicyMeta = PolicyMeta {
        id: "order.dispose_placement",
        key: "dispose-placement",
        title: "Dispose follows constructors",
        compatibility: Compatibility::Strict,
        grouped: false,
    };
}

fn is_explicit_dispose(decl: &Declaration) -> bool {
    decl.symbol
        .explicit_interface
        .as_deref()
        .is_some_and(|iface| iface.rsplit('.').next() == Some("IDisposable"))
}

/// Public parameterless `Dispose()` or an explicit `IDisposable.Dispose()`.
pub(crate) fn qualifies(decl: &Declaration) -> bool {
    decl.is_parameterless_method("Dispose")
        && !decl.is_static
        && ((decl.accessibility == Accessibility::Public && decl.symbol.explicit_interface.is_none())
            || is_explicit_dispose(decl))
}

/// Accessibility bracket of the Dispose method; explicit implementations are public.
fn bracket(decl: &Declaration) -> Accessibility {
    if is_explicit_dispose(decl) {
        Accessibility::Public
    } else {
        decl.accessibility
    }
}

struct Layout {
    dispose: (usize, DeclId),
    lifecycle: Vec<(usize, DeclId)>,
    bracket: Vec<(usize, DeclId)>,
}

fn layout(container: &Container) -> Option<Layout> {
    let (pos, id, dispose) = container.members().find(|(_, _, d)| qualifies(d))?;
    let access = bracket(dispose);

    let lifecycle = container
        .members()
        .filter(|(_, _, d)| matches!(d.kind, DeclKind::Constructor { .. } | DeclKind::Finalizer))
        .map(|(p, i, _)| (p, i))
        .collect();
    let bracket = container
        .members()
        .filter(|(p, _, d)| {
            *p != pos
                && d.is_method()
                && !d.is_static
                && d.name != "Dispose"
                && d.symbol.explicit_interface.is_none()
                && d.accessibility == access
        })
        .map(|(p, i, _)| (p, i))
        .collect();

    Some(Layout {
        dispose: (pos, id),
        lifecycle,
        bracket,
    })
}

impl OrderingPolicy for DisposePlacement {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn applies_to(&self, container: &Container) -> bool {
        container
            .base_list
            .iter()
            .any(|b| b.simple_name() == "IDisposable")
            || container.members().any(|(_, _, d)| qualifies(d))
    }

    fn expected_order(&self, container: &Container) -> Expected {
        let Some(layout) = layout(container) else {
            return Expected::Members(Vec::new());
        };
        let group = layout
            .lifecycle
            .iter()
            .map(|(_, id)| *id)
            .chain(std::iter::once(layout.dispose.1))
            .chain(layout.bracket.iter().map(|(_, id)| *id))
            .collect();
        Expected::Members(vec![group])
    }

    fn locate(&self, container: &Container, expected: &Expected) -> Option<Misplacement> {
        let layout = layout(container)?;
        let (dispose_pos, dispose) = layout.dispose;
        let last_lifecycle = layout.lifecycle.iter().max_by_key(|(p, _)| *p).copied();

        let after_lifecycle = last_lifecycle.is_some_and(|(p, _)| p > dispose_pos);
        let method_in_between = layout.bracket.iter().any(|(p, _)| {
            *p < dispose_pos && last_lifecycle.is_none_or(|(last, _)| *p > last)
        });
        if !after_lifecycle && !method_in_between {
            return None;
        }

        let anchor = match last_lifecycle {
            Some((_, id)) => Anchor::After(id),
            None => {
                let (_, first) = layout.bracket.iter().min_by_key(|(p, _)| *p)?;
                Anchor::Before(*first)
            }
        };

        let group = match expected {
            Expected::Members(groups) => groups.first().cloned().unwrap_or_default(),
            Expected::BaseList(_) => Vec::new(),
        };
        Some(Misplacement {
            subject: Subject::Member { id: dispose },
            placement: Placement {
                anchor,
                grouped: false,
            },
            expected: order::signatures(container, &group),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::fixtures::*;
    use orderfix_types::container::BaseType;
    use orderfix_types::model::SymbolInfo;

    fn public(d: Declaration) -> Declaration {
        d.with_accessibility(Accessibility::Public)
    }

    fn detect(c: &Container) -> Option<Misplacement> {
        let policy = DisposePlacement;
        if !policy.applies_to(c) {
            return None;
        }
        policy.locate(c, &policy.expected_order(c))
    }

    #[test]
    fn dispose_before_constructor_moves_after_last_constructor() {
        let mut c = class("Resource");
        let dispose = add(&mut c, public(method("Dispose", &[])));
        add(&mut c, public(ctor("Resource", &[])));
        let last = add(&mut c, public(ctor("Resource", &["int"])));

        let m = detect(&c).unwrap();
        assert_eq!(m.subject, Subject::Member { id: dispose });
        assert_eq!(m.placement.anchor, Anchor::After(last));
        assert_eq!(m.expected, vec!["Resource()", "Resource(int)", "Dispose()"]);
    }

    #[test]
    fn method_between_constructor_and_dispose_is_flagged() {
        let mut c = class("Resource");
        let ctor_id = add(&mut c, public(ctor("Resource", &[])));
        add(&mut c, public(method("Open", &[])));
        let dispose = add(&mut c, public(method("Dispose", &[])));

        let m = detect(&c).unwrap();
        assert_eq!(m.subject, Subject::Member { id: dispose });
        assert_eq!(m.placement.anchor, Anchor::After(ctor_id));
    }

    #[test]
    fn other_accessibility_brackets_are_ignored() {
        let mut c = class("Resource");
        add(&mut c, public(ctor("Resource", &[])));
        add(&mut c, method("Helper", &[]));
        add(&mut c, public(method("Dispose", &[])));
        assert!(detect(&c).is_none());
    }

    #[test]
    fn explicit_interface_dispose_without_constructors() {
        let mut c = class("Resource");
        c.base_list.push(BaseType::interface("System.IDisposable"));
        let open = add(&mut c, public(method("Open", &[])));
        let dispose = add(
            &mut c,
            method("Dispose", &[]).with_symbol(SymbolInfo {
                is_override: false,
                explicit_interface: Some("System.IDisposable".into()),
            }),
        );

        let m = detect(&c).unwrap();
        assert_eq!(m.subject, Subject::Member { id: dispose });
        assert_eq!(m.placement.anchor, Anchor::Before(open));
    }

    #[test]
    fn non_disposable_types_are_skipped() {
        let mut c = class("Plain");
        add(&mut c, method("Dispose", &["bool"]));
        add(&mut c, public(ctor("Plain", &[])));
        assert!(!DisposePlacement.applies_to(&c));
    }
}
