use crate::order;
use crate::policy::{Compatibility, Expected, Misplacement, OrderingPolicy, PolicyMeta};
use orderfix_types::container::Container;
use orderfix_types::violation::{Anchor, Placement, Subject};

/// `GetHashCode()` sits directly after an `Equals` method.
pub struct HashAfterEquals;

impl HashAfterEquals {
    const META: PolicyMeta = PolicyMeta {
        id: "order.hash_after_equals",
        key: "hash-after-equals",
        title: "GetHashCode follows Equals",
        compatibility: Compatibility::Strict,
        grouped: true,
    };
}

impl OrderingPolicy for HashAfterEquals {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn expected_order(&self, container: &Container) -> Expected {
        let equals = container
            .members()
            .filter(|(_, _, d)| d.is_method() && d.name == "Equals")
            .map(|(_, id, _)| id);
        let hash = container
            .members()
            .find(|(_, _, d)| d.is_parameterless_method("GetHashCode") && !d.is_static)
            .map(|(_, id, _)| id);
        Expected::Members(vec![equals.chain(hash).collect()])
    }

    fn locate(&self, container: &Container, expected: &Expected) -> Option<Misplacement> {
        let Expected::Members(groups) = expected else {
            return None;
        };
        let group = groups.first()?;
        let (&hash, equals) = group.split_last()?;
        if equals.is_empty() || container.decl(hash)?.name != "GetHashCode" {
            return None;
        }

        let pos = container.position(hash)?;
        let follows_equals = pos
            .checked_sub(1)
            .and_then(|prev| container.decl_at(prev))
            .is_some_and(|d| d.is_method() && d.name == "Equals");
        if follows_equals {
            return None;
        }

        let last_equals = equals.iter().max_by_key(|id| container.position(**id))?;
        Some(Misplacement {
            subject: Subject::Member { id: hash },
            placement: Placement {
                anchor: Anchor::After(*last_equals),
                grouped: true,
            },
            expected: order::signatures(container, group),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::fixtures::*;

    fn detect(c: &Container) -> Option<Misplacement> {
        let policy = HashAfterEquals;
        policy.locate(c, &policy.expected_order(c))
    }

    #[test]
    fn hash_code_far_from_equals_moves_after_last_equals() {
        let mut c = class("Point");
        add(&mut c, method("Equals", &["object"]));
        let typed = add(&mut c, method("Equals", &["Point"]));
        add(&mut c, method("ToString", &[]));
        let hash = add(&mut c, method("GetHashCode", &[]));

        let m = detect(&c).unwrap();
        assert_eq!(m.subject, Subject::Member { id: hash });
        assert_eq!(m.placement.anchor, Anchor::After(typed));
        assert_eq!(
            m.expected,
            vec!["Equals(object)", "Equals(Point)", "GetHashCode()"]
        );
    }

    #[test]
    fn hash_code_before_equals_is_flagged() {
        let mut c = class("Point");
        let hash = add(&mut c, method("GetHashCode", &[]));
        add(&mut c, method("Equals", &["object"]));
        let m = detect(&c).unwrap();
        assert_eq!(m.subject, Subject::Member { id: hash });
    }

    #[test]
    fn directly_following_any_equals_is_compatible() {
        let mut c = class("Point");
        add(&mut c, method("Equals", &["object"]));
        add(&mut c, method("GetHashCode", &[]));
        add(&mut c, method("Equals", &["Point"]));
        assert!(detect(&c).is_none());
    }

    #[test]
    fn no_equals_means_nothing_to_pair() {
        let mut c = class("Point");
        add(&mut c, method("ToString", &[]));
        add(&mut c, method("GetHashCode", &[]));
        assert!(detect(&c).is_none());
    }
}
