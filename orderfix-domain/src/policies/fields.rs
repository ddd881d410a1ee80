use super::is_test_class;
use crate::order;
use crate::policy::{Compatibility, Expected, OrderingPolicy, PolicyMeta};
use orderfix_types::container::Container;
use orderfix_types::model::{DeclKind, Declaration};

/// Constants, then static readonly, then mutable static, then instance fields. In test classes
/// the object-under-test field leads its bracket.
pub struct FieldModifiers;

impl FieldModifiers {
    const META: PolicyMeta = PolicyMeta {
        id: "order.field_modifiers",
        key: "field-modifiers",
        title: "Fields are ordered by modifier",
        compatibility: Compatibility::Strict,
        grouped: false,
    };
}

const OBJECT_UNDER_TEST_NAMES: &[&str] = &[
    "ObjectUnderTest",
    "objectUnderTest",
    "_objectUnderTest",
    "Sut",
    "sut",
    "_sut",
];

fn modifier_rank(decl: &Declaration) -> u8 {
    match &decl.kind {
        DeclKind::Field { is_const: true, .. } => 0,
        DeclKind::Field {
            is_readonly: true, ..
        } if decl.is_static => 1,
        DeclKind::Field { .. } if decl.is_static => 2,
        _ => 3,
    }
}

/// Type under test, inferred from the fixture name (`FooTests` -> `Foo`).
fn tested_type(container: &Container) -> Option<&str> {
    let name = container.name.as_str();
    ["Tests", "Test"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .filter(|s| !s.is_empty())
}

fn is_object_under_test(decl: &Declaration, tested: Option<&str>) -> bool {
    let DeclKind::Field { type_name, .. } = &decl.kind else {
        return false;
    };
    OBJECT_UNDER_TEST_NAMES.contains(&decl.name.as_str())
        || tested.is_some_and(|t| type_name.split('<').next().map(str::trim) == Some(t))
}

impl OrderingPolicy for FieldModifiers {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn expected_order(&self, container: &Container) -> Expected {
        let test_class = is_test_class(container);
        let tested = tested_type(container);

        let fields = container
            .members()
            .filter(|(_, _, d)| matches!(d.kind, DeclKind::Field { .. }))
            .map(|(pos, id, _)| (pos, id))
            .collect();
        let group = order::canonical(container, fields, |d, _| {
            let out = test_class && is_object_under_test(d, tested);
            (modifier_rank(d), !out)
        });
        Expected::Members(vec![group])
    }
}
