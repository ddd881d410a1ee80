//! Detector behaviour over whole containers and the full built-in registry.

use orderfix_domain::{PolicyConfig, PolicyRegistry, detect, detect_all, is_test_class};
use orderfix_types::container::{BaseType, Container, ContainerKind};
use orderfix_types::decor::Decoration;
use orderfix_types::model::{Accessibility, DeclKind, Declaration, Location, Param};
use orderfix_types::violation::{Anchor, Subject};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn method(name: &str, types: &[&str]) -> Declaration {
    Declaration::new(
        name,
        DeclKind::Method {
            params: types
                .iter()
                .map(|t| Param {
                    name: String::new(),
                    type_name: (*t).to_string(),
                    variadic: false,
                })
                .collect(),
        },
    )
    .with_accessibility(Accessibility::Public)
}

fn class(name: &str) -> Container {
    Container::new(name, ContainerKind::Class, Location::default())
}

fn rules(c: &Container) -> Vec<String> {
    detect_all(c, &PolicyRegistry::default())
        .into_iter()
        .map(|v| v.rule_id)
        .collect()
}

#[test]
fn unsorted_overloads_report_the_sorted_layout() {
    let mut c = class("Widget");
    c.push(method("Foo", &["int"]), Decoration::default());
    let zero = c.push(method("Foo", &[]), Decoration::default());
    c.push(method("Foo", &["string", "int"]), Decoration::default());

    let registry = PolicyRegistry::default();
    let policy = registry.get("order.overloads_sorted").unwrap();
    let v = detect(&c, policy).unwrap();
    assert_eq!(v.member(), Some(zero));
    assert_eq!(
        v.expected_order,
        vec!["Foo()", "Foo(int)", "Foo(string, int)"]
    );
    // Adjacent overloads satisfy the proximity policy regardless of order.
    assert_eq!(rules(&c), vec!["order.overloads_sorted"]);
}

#[test]
fn interface_list_reports_base_type_subject() {
    let mut c = class("Foo");
    c.base_list = vec![
        BaseType::interface("IComparable<Foo>"),
        BaseType::interface("IFoo"),
        BaseType::interface("IBar"),
    ];
    c.push(method("CompareTo", &["Foo"]), Decoration::default());

    let registry = PolicyRegistry::default();
    let v = detect(&c, registry.get("interface-list").unwrap()).unwrap();
    assert_eq!(
        v.subject,
        Subject::BaseType {
            index: 1,
            name: "IFoo".into()
        }
    );
    assert_eq!(v.placement.anchor, Anchor::BaseListIndex(0));
    assert!(v.message.contains("front of the base list"));
}

#[test]
fn fields_report_const_before_instance() {
    let mut c = class("Widget");
    c.push(
        Declaration::new(
            "X",
            DeclKind::Field {
                type_name: "int".into(),
                is_const: false,
                is_readonly: false,
            },
        ),
        Decoration::default(),
    );
    c.push(
        Declaration::new(
            "Y",
            DeclKind::Field {
                type_name: "int".into(),
                is_const: true,
                is_readonly: false,
            },
        ),
        Decoration::default(),
    );
    assert_eq!(rules(&c), vec!["order.field_modifiers"]);
}

#[test]
fn test_classes_are_recognized_by_member_attributes() {
    let mut c = class("Whatever");
    assert!(!is_test_class(&c));
    c.push(
        method("Works", &[]).with_attribute("Xunit.FactAttribute"),
        Decoration::default(),
    );
    assert!(is_test_class(&c));
}

#[test]
fn proximity_threshold_is_configurable() {
    let mut c = class("Widget");
    c.push(method("Foo", &[]), Decoration::default());
    c.push(method("Bar", &[]), Decoration::default());
    c.push(method("Foo", &["int"]), Decoration::default());

    let strict = PolicyRegistry::builtin(&PolicyConfig::default());
    let loose = PolicyRegistry::builtin(&PolicyConfig {
        proximity_threshold: 2,
    });
    let adjacent = |r: &PolicyRegistry| detect(&c, r.get("overloads-adjacent").unwrap());
    assert!(adjacent(&strict).is_some());
    assert!(adjacent(&loose).is_none());
}

fn arb_container() -> impl Strategy<Value = Container> {
    let names = prop::sample::select(vec!["Foo", "Bar", "Equals", "GetHashCode", "Dispose"]);
    prop::collection::vec((names, 0usize..3, any::<bool>()), 0..10).prop_map(|specs| {
        let mut c = class("Generated");
        for (name, arity, is_static) in specs {
            let types = vec!["int"; arity];
            c.push(
                method(name, &types).with_static(is_static),
                Decoration::default(),
            );
        }
        c
    })
}

proptest! {
    #[test]
    fn detection_is_deterministic(c in arb_container()) {
        let registry = PolicyRegistry::default();
        let first = detect_all(&c, &registry);
        let second = detect_all(&c, &registry);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn violations_name_members_of_the_container(c in arb_container()) {
        for v in detect_all(&c, &PolicyRegistry::default()) {
            if let Some(id) = v.member() {
                prop_assert!(c.position(id).is_some());
            }
            if let Some(anchor) = v.placement.anchor.decl() {
                prop_assert!(c.position(anchor).is_some());
                prop_assert_ne!(Some(anchor), v.member());
            }
        }
    }
}
