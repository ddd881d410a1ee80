//! Built-in ordering policies.

mod dispose;
mod fields;
mod hash_equals;
mod interfaces;
mod lifecycle;
mod operators;
mod overloads;

pub use dispose::DisposePlacement;
pub use fields::FieldModifiers;
pub use hash_equals::HashAfterEquals;
pub use interfaces::InterfaceList;
pub use lifecycle::TestLifecycle;
pub use operators::OperatorsBeforeMethods;
pub use overloads::{OverloadsAdjacent, OverloadsSorted};

use crate::policy::{OrderingPolicy, PolicyConfig};
use orderfix_types::container::Container;

/// Attributes that mark a container as a test fixture.
const FIXTURE_ATTRIBUTES: &[&str] = &["TestFixture", "TestClass"];

/// A class marked as a fixture, or one with any member carrying a test lifecycle attribute.
pub fn is_test_class(container: &Container) -> bool {
    FIXTURE_ATTRIBUTES.iter().any(|a| container.has_attribute(a))
        || container
            .members()
            .any(|(_, _, d)| d.normalized_attributes().any(|a| lifecycle::phase_of(a).is_some()))
}

pub(crate) fn builtin(config: &PolicyConfig) -> Vec<Box<dyn OrderingPolicy>> {
    vec![
        Box::new(OverloadsSorted),
        Box::new(OverloadsAdjacent::new(config.proximity_threshold)),
        Box::new(DisposePlacement),
        Box::new(OperatorsBeforeMethods),
        Box::new(HashAfterEquals),
        Box::new(InterfaceList),
        Box::new(FieldModifiers),
        Box::new(TestLifecycle),
    ]
}
