use crate::policy::{Compatibility, Expected, OrderingPolicy, PolicyMeta};
use orderfix_types::container::{BaseKind, Container};

/// The interface named `I` + type name comes first in the base list, right after any base class.
pub struct InterfaceList;

impl InterfaceList {
    const META: PolicyMeta = PolicyMeta {
        id: "order.interface_list",
        key: "interface-list",
        title: "Matching interface is listed first",
        compatibility: Compatibility::Strict,
        grouped: false,
    };
}

fn simple_type_name(name: &str) -> &str {
    name.split('<').next().unwrap_or(name).trim()
}

impl OrderingPolicy for InterfaceList {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn applies_to(&self, container: &Container) -> bool {
        container
            .base_list
            .iter()
            .filter(|b| b.kind == BaseKind::Interface)
            .count()
            >= 2
    }

    fn expected_order(&self, container: &Container) -> Expected {
        let bases = &container.base_list;
        let identity: Vec<usize> = (0..bases.len()).collect();

        let wanted = format!("I{}", simple_type_name(&container.name));
        let Some(named) = bases
            .iter()
            .position(|b| b.kind == BaseKind::Interface && b.simple_name() == wanted)
        else {
            return Expected::BaseList(identity);
        };

        let base_class = bases
            .first()
            .filter(|b| b.kind == BaseKind::Class)
            .map(|_| 0usize);
        let order = base_class
            .into_iter()
            .chain(std::iter::once(named))
            .chain(identity.into_iter().filter(|i| *i != named && Some(*i) != base_class))
            .collect();
        Expected::BaseList(order)
    }
}
