//! Configuration file loading for orderfix.
//!
//! Discovers and loads `orderfix.toml` from the snapshot root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use orderfix_core::settings::DEFAULT_MAX_PASSES;
use orderfix_domain::PolicyConfig;
use orderfix_edit::{RewriteOptions, SoleMemberRegions};
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "orderfix.toml";

/// Top-level configuration from orderfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderfixConfig {
    /// Policy selection (allow/deny lists over rule ids).
    pub policies: PoliciesConfig,

    /// Overload grouping settings.
    pub overloads: OverloadsConfig,

    /// Rewriter settings.
    pub rewrite: RewriteConfig,
}

/// Policies section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PoliciesConfig {
    /// Allowlist patterns for rule ids.
    /// If non-empty, only allowlisted policies run.
    pub allow: Vec<String>,

    /// Denylist patterns for rule ids.
    pub deny: Vec<String>,
}

/// Overloads section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverloadsConfig {
    /// Largest allowed distance between neighbouring overloads for `order.overloads_adjacent`.
    pub proximity_threshold: usize,
}

impl Default for OverloadsConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: PolicyConfig::default().proximity_threshold,
        }
    }
}

/// Rewrite section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// What happens to a region whose only member moves.
    pub sole_member_regions: SoleMemberRegions,

    /// Upper bound on detect/rewrite passes per container.
    pub max_passes: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            sole_member_regions: SoleMemberRegions::default(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Discover the orderfix.toml config file.
///
/// Searches for `orderfix.toml` in the snapshot root directory.
/// Returns `None` if no config file is found.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse an orderfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<OrderfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<OrderfixConfig> {
    let config: OrderfixConfig = toml::from_str(contents).context("invalid TOML")?;
    if config.rewrite.max_passes == 0 {
        anyhow::bail!("rewrite.max_passes must be at least 1");
    }
    Ok(config)
}

/// Load config from the snapshot root, or return default if not found.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<OrderfixConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(OrderfixConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
    /// Allow patterns (from config file, extended by CLI).
    pub allow: Vec<String>,

    /// Deny patterns (from config file, extended by CLI).
    pub deny: Vec<String>,

    pub policy: PolicyConfig,
    pub rewrite: RewriteOptions,
    pub max_passes: usize,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: OrderfixConfig,
}

impl ConfigMerger {
    pub fn new(config: OrderfixConfig) -> Self {
        Self { config }
    }

    /// Merge with check command CLI arguments.
    ///
    /// CLI `allow` and `deny` lists extend the config file lists.
    pub fn merge_check_args(self, cli_allow: &[String], cli_deny: &[String]) -> MergedConfig {
        let allow = extend_unique(&self.config.policies.allow, cli_allow);
        let deny = extend_unique(&self.config.policies.deny, cli_deny);

        MergedConfig {
            allow,
            deny,
            policy: PolicyConfig {
                proximity_threshold: self.config.overloads.proximity_threshold,
            },
            rewrite: RewriteOptions {
                sole_member_regions: self.config.rewrite.sole_member_regions,
            },
            max_passes: self.config.rewrite.max_passes,
        }
    }

    /// Merge with fix command CLI arguments.
    ///
    /// Explicit CLI values override the `[rewrite]` section.
    pub fn merge_fix_args(
        self,
        cli_allow: &[String],
        cli_deny: &[String],
        cli_sole_member_regions: Option<SoleMemberRegions>,
        cli_max_passes: Option<usize>,
    ) -> MergedConfig {
        let mut merged = self.merge_check_args(cli_allow, cli_deny);
        if let Some(mode) = cli_sole_member_regions {
            merged.rewrite.sole_member_regions = mode;
        }
        if let Some(passes) = cli_max_passes {
            merged.max_passes = passes;
        }
        merged
    }
}

fn extend_unique(base: &[String], extra: &[String]) -> Vec<String> {
    let mut out = base.to_vec();
    for pattern in extra {
        if !out.contains(pattern) {
            out.push(pattern.clone());
        }
    }
    out
}
