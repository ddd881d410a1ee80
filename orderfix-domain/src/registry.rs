use crate::policies;
use crate::policy::{OrderingPolicy, PolicyConfig, PolicyMeta};
use tracing::debug;

/// The active set of ordering policies, in evaluation order.
pub struct PolicyRegistry {
    policies: Vec<Box<dyn OrderingPolicy>>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::builtin(&PolicyConfig::default())
    }
}

impl PolicyRegistry {
    pub fn builtin(config: &PolicyConfig) -> Self {
        Self {
            policies: policies::builtin(config),
        }
    }

    pub fn with_policies(policies: Vec<Box<dyn OrderingPolicy>>) -> Self {
        Self { policies }
    }

    /// Keep policies whose id or key matches `allow` (empty = all) and matches nothing in `deny`.
    /// Deny wins.
    pub fn filtered(self, allow: &[String], deny: &[String]) -> Self {
        let matches = |patterns: &[String], meta: &PolicyMeta| {
            patterns
                .iter()
                .any(|p| glob_match(p, meta.id) || glob_match(p, meta.key))
        };

        let policies = self
            .policies
            .into_iter()
            .filter(|p| {
                let meta = p.meta();
                let allowed = allow.is_empty() || matches(allow, meta);
                let denied = matches(deny, meta);
                if !allowed || denied {
                    debug!(policy = meta.id, allowed, denied, "policy disabled");
                }
                allowed && !denied
            })
            .collect();
        Self { policies }
    }

    pub fn get(&self, id_or_key: &str) -> Option<&dyn OrderingPolicy> {
        self.policies
            .iter()
            .find(|p| p.meta().id == id_or_key || p.meta().key == id_or_key)
            .map(|p| p.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn OrderingPolicy> {
        self.policies.iter().map(|p| p.as_ref())
    }

    pub fn metas(&self) -> Vec<PolicyMeta> {
        self.iter().map(|p| p.meta().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Metadata of every built-in policy, for listings and explanations.
pub fn builtin_policy_metas() -> Vec<PolicyMeta> {
    PolicyRegistry::default().metas()
}

/// Glob match with `*` (any run) and `?` (one character).
pub fn glob_match(pat: &str, text: &str) -> bool {
    let p = pat.as_bytes();
    let t = text.as_bytes();
    let mut dp = vec![vec![false; t.len() + 1]; p.len() + 1];
    dp[0][0] = true;

    for i in 1..=p.len() {
        if p[i - 1] == b'*' {
            dp[i][0] = dp[i - 1][0];
        }
    }

    for i in 1..=p.len() {
        for j in 1..=t.len() {
            dp[i][j] = match p[i - 1] {
                b'*' => dp[i - 1][j] || dp[i][j - 1],
                b'?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }

    dp[p.len()][t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(registry: &PolicyRegistry) -> Vec<&'static str> {
        registry.metas().iter().map(|m| m.id).collect()
    }

    #[test]
    fn glob_match_handles_star_and_question() {
        assert!(glob_match("order.*", "order.hash_after_equals"));
        assert!(glob_match("*-sorted", "overloads-sorted"));
        assert!(!glob_match("order.?", "order.ab"));
        assert!(glob_match("order.??", "order.ab"));
    }

    #[test]
    fn builtin_registry_holds_every_policy() {
        let registry = PolicyRegistry::default();
        assert_eq!(
            ids(&registry),
            vec![
                "order.overloads_sorted",
                "order.overloads_adjacent",
                "order.dispose_placement",
                "order.operators_before_methods",
                "order.hash_after_equals",
                "order.interface_list",
                "order.field_modifiers",
                "order.test_lifecycle",
            ]
        );
    }

    #[test]
    fn deny_wins_over_allow() {
        let registry = PolicyRegistry::default().filtered(
            &["order.overloads_*".to_string()],
            &["overloads-adjacent".to_string()],
        );
        assert_eq!(ids(&registry), vec!["order.overloads_sorted"]);
    }

    #[test]
    fn empty_allow_means_all() {
        let registry = PolicyRegistry::default().filtered(&[], &["order.test_*".to_string()]);
        assert_eq!(registry.len(), 7);
        assert!(registry.get("test-lifecycle").is_none());
        assert!(registry.get("dispose-placement").is_some());
    }
}
