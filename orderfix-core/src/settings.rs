//! Clap-free settings for check and fix pipelines.

use camino::Utf8PathBuf;
use orderfix_domain::PolicyConfig;
use orderfix_edit::RewriteOptions;

pub const DEFAULT_MAX_PASSES: usize = 8;

/// Settings for the check pipeline.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    pub snapshots_dir: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    // Policy selection
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub policy: PolicyConfig,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            snapshots_dir: Utf8PathBuf::from("snapshots"),
            out_dir: Utf8PathBuf::from("artifacts/orderfix"),
            allow: Vec::new(),
            deny: Vec::new(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Settings for the fix pipeline.
#[derive(Debug, Clone)]
pub struct FixSettings {
    pub snapshots_dir: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    // Policy selection
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    pub policy: PolicyConfig,

    // Rewriting
    pub rewrite: RewriteOptions,

    /// Upper bound on detect/rewrite passes per container.
    pub max_passes: usize,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            snapshots_dir: Utf8PathBuf::from("snapshots"),
            out_dir: Utf8PathBuf::from("artifacts/orderfix"),
            allow: Vec::new(),
            deny: Vec::new(),
            policy: PolicyConfig::default(),
            rewrite: RewriteOptions::default(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl FixSettings {
    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings {
            snapshots_dir: self.snapshots_dir.clone(),
            out_dir: self.out_dir.clone(),
            allow: self.allow.clone(),
            deny: self.deny.clone(),
            policy: self.policy.clone(),
        }
    }
}
