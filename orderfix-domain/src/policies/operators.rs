use crate::order;
use crate::policy::{Compatibility, Expected, Misplacement, OrderingPolicy, PolicyMeta};
use orderfix_types::container::Container;
use orderfix_types::model::DeclKind;
use orderfix_types::violation::{Anchor, Placement, Subject};

/// Operator declarations precede the first ordinary method.
pub struct OperatorsBeforeMethods;

impl OperatorsBeforeMethods {
    const META: PolicyMeta = PolicyMeta {
        id: "order.operators_before_methods",
        key: "operators-before-methods",
        title: "Operators precede methods",
        compatibility: Compatibility::Strict,
        grouped: false,
    };
}

impl OrderingPolicy for OperatorsBeforeMethods {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn expected_order(&self, container: &Container) -> Expected {
        let operators = container
            .members()
            .filter(|(_, _, d)| matches!(d.kind, DeclKind::Operator { .. }))
            .map(|(_, id, _)| id);
        let methods = container
            .members()
            .filter(|(_, _, d)| d.is_method())
            .map(|(_, id, _)| id);
        Expected::Members(vec![operators.chain(methods).collect()])
    }

    fn locate(&self, container: &Container, expected: &Expected) -> Option<Misplacement> {
        let (first_method_pos, first_method, _) =
            container.members().find(|(_, _, d)| d.is_method())?;
        let (_, operator, _) = container.members().find(|(pos, _, d)| {
            *pos > first_method_pos && matches!(d.kind, DeclKind::Operator { .. })
        })?;

        let group = match expected {
            Expected::Members(groups) => groups.first().cloned().unwrap_or_default(),
            Expected::BaseList(_) => Vec::new(),
        };
        Some(Misplacement {
            subject: Subject::Member { id: operator },
            placement: Placement {
                anchor: Anchor::Before(first_method),
                grouped: false,
            },
            expected: order::signatures(container, &group),
        })
    }
}
