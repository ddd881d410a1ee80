//! Rule explanations for the `orderfix explain` command.
//!
//! Provides detailed explanations of each rule including:
//! - What order the rule expects
//! - Which containers it applies to
//! - How `orderfix fix` moves the offending declaration

use orderfix_domain::{Compatibility, UNBALANCED_REGION_RULE};

/// Information about an orderfix rule.
#[derive(Debug, Clone)]
pub struct RuleExplanation {
    /// Short key for the rule (user-facing, e.g., "overloads-sorted").
    pub key: &'static str,
    /// Stable rule ID (e.g., "order.overloads_sorted").
    pub rule_id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// How actual positions are compared with expected ones. `None` for index diagnostics.
    pub compatibility: Option<Compatibility>,
    /// Detailed description of the expected order.
    pub description: &'static str,
    /// Which containers the rule inspects.
    pub applies_to: &'static str,
    /// What the fix does with declarations, blank lines and regions.
    pub fix_behavior: &'static str,
}

/// Registry of all rule explanations.
pub static RULE_REGISTRY: &[RuleExplanation] = &[
    // 1) Overloads, strict
    RuleExplanation {
        key: "overloads-sorted",
        rule_id: "order.overloads_sorted",
        title: "Overloads are contiguous and sorted",
        compatibility: Some(Compatibility::Strict),
        description: r#"All members sharing a name form one contiguous group, sorted by:
- accessibility (public, protected internal, internal, protected, private protected, private)
- static before instance
- variadic parameter list last
- ascending parameter count
- parameter types, then parameter names

Example expected order:
    public static Parse(string)
    public Parse(string, int)
    private Parse(string, int, int)"#,
        applies_to: r#"Every container. Override methods and explicit interface
implementations are excluded, except `IDisposable.Dispose`."#,
        fix_behavior: r#"Members outside the longest correctly ordered run are moved one per
pass, after their nearest in-place predecessor. The moved member keeps its doc
comment. Because the rule is grouped, a member landing next to an overload inside
a region joins that region."#,
    },
    // 2) Overloads, proximity
    RuleExplanation {
        key: "overloads-adjacent",
        rule_id: "order.overloads_adjacent",
        title: "Overloads are side by side",
        compatibility: Some(Compatibility::Proximity),
        description: r#"Overloads must sit next to each other. Their internal order does not
matter, but no two neighbouring overloads may be further apart than the
proximity threshold (default 1, configurable via `[overloads]
proximity_threshold` in orderfix.toml)."#,
        applies_to: "Every container, with the same exclusions as `overloads-sorted`.",
        fix_behavior: r#"The first overload beyond the threshold moves right after the previous
overload of its group. Grouped: it joins regions around that overload."#,
    },
    // 3) Dispose
    RuleExplanation {
        key: "dispose-placement",
        rule_id: "order.dispose_placement",
        title: "Dispose follows constructors",
        compatibility: Some(Compatibility::Strict),
        description: r#"A public parameterless `Dispose()` (or `IDisposable.Dispose()`) comes after
every constructor and finalizer and before any other instance method."#,
        applies_to: r#"Disposable types: the base list names `IDisposable` or the type declares a
qualifying `Dispose`."#,
        fix_behavior: r#"Dispose moves right after the last constructor or finalizer. A region
that covers only Dispose travels with it (or is dropped with
`--sole-member-regions drop`)."#,
    },
    // 4) Operators
    RuleExplanation {
        key: "operators-before-methods",
        rule_id: "order.operators_before_methods",
        title: "Operators precede methods",
        compatibility: Some(Compatibility::Strict),
        description: "Operator declarations come before the first ordinary method.",
        applies_to: "Containers declaring at least one operator and one method.",
        fix_behavior: "The first operator found after a method moves before that method.",
    },
    // 5) GetHashCode
    RuleExplanation {
        key: "hash-after-equals",
        rule_id: "order.hash_after_equals",
        title: "GetHashCode follows Equals",
        compatibility: Some(Compatibility::Strict),
        description: r#"`GetHashCode` is the declaration immediately following an `Equals`
method. With several `Equals` overloads, the last one is the anchor."#,
        applies_to: "Containers declaring both `Equals` and `GetHashCode`.",
        fix_behavior: r#"GetHashCode moves right after Equals and joins any region Equals is
part of."#,
    },
    // 6) Interface list
    RuleExplanation {
        key: "interface-list",
        rule_id: "order.interface_list",
        title: "Matching interface is listed first",
        compatibility: Some(Compatibility::Strict),
        description: r#"When a type implements an interface named `I` + type name, that
interface is listed first among the interfaces, right after any base class.

Example:
    class Widget : Control, IWidget, IDisposable"#,
        applies_to: "Types whose base list holds at least two interfaces.",
        fix_behavior: "Reorders the base list only; members and decoration are untouched.",
    },
    // 7) Fields
    RuleExplanation {
        key: "field-modifiers",
        rule_id: "order.field_modifiers",
        title: "Fields are ordered by modifier",
        compatibility: Some(Compatibility::Strict),
        description: r#"Fields are ordered const, static readonly, static, then instance. In a test
class the object-under-test field comes first within its bracket: a field named
`Sut` or `ObjectUnderTest` (any casing or leading underscore), or one whose type
is the class name without its `Test`/`Tests` suffix."#,
        applies_to: "Every container with fields.",
        fix_behavior: r#"Out-of-order fields move one per pass after the nearest field already in
place. Regions are split around the moved field rather than joined."#,
    },
    // 8) Test lifecycle
    RuleExplanation {
        key: "test-lifecycle",
        rule_id: "order.test_lifecycle",
        title: "Test lifecycle methods are in run order",
        compatibility: Some(Compatibility::Strict),
        description: r#"Lifecycle methods appear in the order they run:
    assembly initialize
    one-time setup
    setup
    tests
    teardown
    one-time teardown
    assembly cleanup"#,
        applies_to: r#"Test classes: attributed `TestFixture` or `TestClass`, or declaring a
member with a test attribute."#,
        fix_behavior: r#"The misplaced lifecycle method moves next to its nearest in-place
neighbour. A region enclosing both methods keeps the moved one."#,
    },
    // 9) Unbalanced regions
    RuleExplanation {
        key: "unbalanced-region",
        rule_id: UNBALANCED_REGION_RULE,
        title: "Region marker without a partner",
        compatibility: None,
        description: r#"A `#region` without a matching `#endregion` (or the reverse) inside one
container. Reported at info level; it never blocks a run."#,
        applies_to: "Every container.",
        fix_behavior: r#"Not fixable. The marker stays where it is, and orderfix refuses to move
any declaration the marker touches until it is balanced by hand."#,
    },
];

/// Look up a rule by key or rule ID.
pub fn lookup_rule(query: &str) -> Option<&'static RuleExplanation> {
    let query_lower = query.to_lowercase();
    let query_normalized = query_lower.replace('_', "-");

    RULE_REGISTRY.iter().find(|rule| {
        rule.key == query_normalized
            || rule.rule_id == query_lower
            // Suffix without the family prefix (e.g., "overloads_sorted")
            || rule.rule_id.ends_with(&format!(".{}", query_lower))
            || rule.rule_id.replace('_', "-").ends_with(&format!(".{}", query_normalized))
    })
}

/// List all available rule keys.
pub fn list_rule_keys() -> Vec<&'static str> {
    RULE_REGISTRY.iter().map(|r| r.key).collect()
}

pub fn format_compatibility(compatibility: Option<Compatibility>) -> &'static str {
    match compatibility {
        Some(Compatibility::Strict) => "Strict",
        Some(Compatibility::Proximity) => "Proximity",
        None => "Index",
    }
}
