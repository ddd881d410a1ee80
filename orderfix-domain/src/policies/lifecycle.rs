use super::is_test_class;
use crate::order;
use crate::policy::{Compatibility, Expected, OrderingPolicy, PolicyMeta};
use orderfix_types::container::Container;

/// Assembly init, one-time setup, setup, tests, teardown, one-time teardown, assembly cleanup.
pub struct TestLifecycle;

impl TestLifecycle {
    const META: PolicyMeta = PolicyMeta {
        id: "order.test_lifecycle",
        key: "test-lifecycle",
        title: "Test lifecycle methods are in run order",
        compatibility: Compatibility::Strict,
        grouped: false,
    };
}

const PHASES: &[(&str, u8)] = &[
    ("AssemblyInitialize", 0),
    ("OneTimeSetUp", 1),
    ("TestFixtureSetUp", 1),
    ("ClassInitialize", 1),
    ("SetUp", 2),
    ("TestInitialize", 2),
    ("Test", 3),
    ("TestCase", 3),
    ("TestCaseSource", 3),
    ("Theory", 3),
    ("Fact", 3),
    ("TestMethod", 3),
    ("DataTestMethod", 3),
    ("TearDown", 4),
    ("TestCleanup", 4),
    ("OneTimeTearDown", 5),
    ("TestFixtureTearDown", 5),
    ("ClassCleanup", 5),
    ("AssemblyCleanup", 6),
];

/// Run phase of a normalized attribute name.
pub(crate) fn phase_of(attribute: &str) -> Option<u8> {
    PHASES
        .iter()
        .find(|(name, _)| *name == attribute)
        .map(|(_, phase)| *phase)
}

impl OrderingPolicy for TestLifecycle {
    fn meta(&self) -> &PolicyMeta {
        &Self::META
    }

    fn applies_to(&self, container: &Container) -> bool {
        is_test_class(container)
    }

    fn expected_order(&self, container: &Container) -> Expected {
        let phased: Vec<_> = container
            .members()
            .filter(|(_, _, d)| d.is_method())
            .filter(|(_, _, d)| d.normalized_attributes().any(|a| phase_of(a).is_some()))
            .map(|(pos, id, _)| (pos, id))
            .collect();
        let group = order::canonical(container, phased, |d, _| {
            d.normalized_attributes().filter_map(phase_of).min()
        });
        Expected::Members(vec![group])
    }
}
