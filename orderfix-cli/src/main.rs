use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use orderfix_cli::config::{self, ConfigMerger, MergedConfig};
use orderfix_cli::explain;
use orderfix_core::adapters::{FsSnapshotSource, FsWritePort};
use orderfix_core::pipeline::{
    ToolError, run_check, run_fix, write_back_snapshots, write_check_artifacts,
    write_fix_artifacts,
};
use orderfix_core::settings::{CheckSettings, FixSettings};
use orderfix_domain::builtin_policy_metas;
use orderfix_edit::SoleMemberRegions;
use orderfix_types::report::{OrderfixReport, ReportStatus, ToolInfo};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "orderfix",
    version,
    about = "Member-ordering checks and decoration-preserving fixes for container snapshots."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Diagnose ordering violations in every snapshot.
    Check(CheckArgs),
    /// Reorder members until every fixable violation is gone.
    Fix(FixArgs),
    /// Explain what a rule expects and how its fix moves declarations.
    Explain(ExplainArgs),
    /// List all ordering policies.
    ListPolicies(ListPoliciesArgs),
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Directory containing snapshot files (and optionally orderfix.toml).
    #[arg(long, default_value = "snapshots")]
    snapshots: Utf8PathBuf,

    /// Output directory for orderfix artifacts (default: artifacts/orderfix).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Allowlist patterns for rule ids.
    #[arg(long)]
    allow: Vec<String>,

    /// Denylist patterns for rule ids.
    #[arg(long)]
    deny: Vec<String>,
}

#[derive(Debug, Parser)]
struct FixArgs {
    #[command(flatten)]
    check: CheckArgs,

    /// Overwrite snapshot files in place. If omitted, fixed copies go to <out_dir>/fixed.
    #[arg(long, default_value_t = false)]
    write: bool,

    /// What happens to a region whose only member moves.
    #[arg(long, value_enum)]
    sole_member_regions: Option<RegionMode>,

    /// Upper bound on detect/rewrite passes per container.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_passes: Option<u32>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Rule key or rule ID to explain (e.g., "overloads-sorted", "order.dispose_placement").
    rule: String,
}

#[derive(Debug, Parser)]
struct ListPoliciesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum RegionMode {
    Travel,
    Drop,
}

impl From<RegionMode> for SoleMemberRegions {
    fn from(mode: RegionMode) -> Self {
        match mode {
            RegionMode::Travel => SoleMemberRegions::Travel,
            RegionMode::Drop => SoleMemberRegions::Drop,
        }
    }
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::from(0),
        Err(e @ ToolError::PolicyBlock) => ExitCode::from(e.exit_code() as u8),
        Err(ToolError::Internal(e)) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> Result<(), ToolError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Fix(args) => cmd_fix(args),
        Command::Explain(args) => Ok(cmd_explain(args)?),
        Command::ListPolicies(args) => Ok(cmd_list_policies(args)?),
    }
}

fn load_merged(
    args: &CheckArgs,
    merge: impl FnOnce(ConfigMerger) -> MergedConfig,
) -> anyhow::Result<MergedConfig> {
    if !args.snapshots.is_dir() {
        anyhow::bail!("snapshot directory {} does not exist", args.snapshots);
    }

    // Load config file and merge with CLI arguments
    let file_config =
        config::load_or_default(&args.snapshots).context("load orderfix.toml config")?;
    let merged = merge(ConfigMerger::new(file_config));

    debug!(
        "merged config: allow={:?}, deny={:?}, proximity_threshold={}, sole_member_regions={:?}, max_passes={}",
        merged.allow,
        merged.deny,
        merged.policy.proximity_threshold,
        merged.rewrite.sole_member_regions,
        merged.max_passes
    );
    Ok(merged)
}

fn out_dir(args: &CheckArgs) -> Utf8PathBuf {
    args.out_dir
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from("artifacts").join("orderfix"))
}

fn cmd_check(args: CheckArgs) -> Result<(), ToolError> {
    let merged = load_merged(&args, |m| m.merge_check_args(&args.allow, &args.deny))?;
    let out_dir = out_dir(&args);

    let settings = CheckSettings {
        snapshots_dir: args.snapshots.clone(),
        out_dir: out_dir.clone(),
        allow: merged.allow,
        deny: merged.deny,
        policy: merged.policy,
    };
    let source = FsSnapshotSource::new(args.snapshots).excluding(out_dir.clone());
    let outcome = run_check(&settings, &source, tool_info())?;

    write_check_artifacts(&outcome, &out_dir, &FsWritePort).context("write check artifacts")?;
    info!("wrote check report to {}", out_dir);
    print_summary(&outcome.report);

    if outcome.policy_block {
        return Err(ToolError::PolicyBlock);
    }
    Ok(())
}

fn cmd_fix(args: FixArgs) -> Result<(), ToolError> {
    let merged = load_merged(&args.check, |m| {
        m.merge_fix_args(
            &args.check.allow,
            &args.check.deny,
            args.sole_member_regions.map(SoleMemberRegions::from),
            args.max_passes.map(|n| n as usize),
        )
    })?;
    let out_dir = out_dir(&args.check);

    let settings = FixSettings {
        snapshots_dir: args.check.snapshots.clone(),
        out_dir: out_dir.clone(),
        allow: merged.allow,
        deny: merged.deny,
        policy: merged.policy,
        rewrite: merged.rewrite,
        max_passes: merged.max_passes,
    };
    let source = FsSnapshotSource::new(args.check.snapshots.clone()).excluding(out_dir.clone());
    let outcome = run_fix(&settings, &source, tool_info())?;

    write_fix_artifacts(&outcome, &out_dir, &FsWritePort).context("write fix artifacts")?;
    info!("wrote fix artifacts to {}", out_dir);

    if args.write {
        let written = write_back_snapshots(&outcome, &FsWritePort).context("write snapshots")?;
        for path in &written.written {
            println!("fixed {}", path);
        }
        if !written.stale.is_empty() {
            let stale: Vec<String> = written.stale.iter().map(|p| p.to_string()).collect();
            return Err(anyhow::anyhow!(
                "snapshots changed since they were read; not overwritten: {}",
                stale.join(", ")
            )
            .into());
        }
    }
    print_summary(&outcome.report);

    if outcome.policy_block {
        return Err(ToolError::PolicyBlock);
    }
    Ok(())
}

fn print_summary(report: &OrderfixReport) {
    for d in &report.diagnostics {
        let line = d
            .location
            .line
            .map(|l| format!(":{}", l))
            .unwrap_or_default();
        println!("{}{}: {}: {}", d.location.path, line, d.rule_id, d.message);
    }

    let counts = &report.verdict.counts;
    let status = match report.verdict.status {
        ReportStatus::Pass => "pass",
        ReportStatus::Warn => "warn",
        ReportStatus::Fail => "fail",
    };
    if counts.fixed > 0 {
        println!(
            "{}: {} diagnostic(s), {} declaration(s) moved",
            status,
            report.diagnostics.len(),
            counts.fixed
        );
    } else {
        println!("{}: {} diagnostic(s)", status, report.diagnostics.len());
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use orderfix_cli::explain::{format_compatibility, list_rule_keys, lookup_rule};

    let Some(rule) = lookup_rule(&args.rule) else {
        let available = list_rule_keys().join(", ");
        anyhow::bail!(
            "Unknown rule: '{}'\n\nAvailable rules: {}",
            args.rule,
            available
        );
    };

    println!("================================================================================");
    println!("RULE: {}", rule.title);
    println!("================================================================================");
    println!();
    println!("Key:            {}", rule.key);
    println!("Rule ID:        {}", rule.rule_id);
    println!("Compatibility:  {}", format_compatibility(rule.compatibility));
    println!();

    println!("EXPECTED ORDER");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.description);
    println!();

    println!("APPLIES TO");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.applies_to);
    println!();

    println!("FIX BEHAVIOR");
    println!("--------------------------------------------------------------------------------");
    println!("{}", rule.fix_behavior);
    println!();

    Ok(())
}

fn cmd_list_policies(args: ListPoliciesArgs) -> anyhow::Result<()> {
    let metas = builtin_policy_metas();

    match args.format {
        OutputFormat::Text => {
            println!("Available policies:\n");
            println!("  {:<32} {:<26} {:<10} TITLE", "RULE ID", "KEY", "MODE");
            println!("  {:<32} {:<26} {:<10} -----", "-------", "---", "----");
            for meta in &metas {
                println!(
                    "  {:<32} {:<26} {:<10} {}",
                    meta.id,
                    meta.key,
                    explain::format_compatibility(Some(meta.compatibility)),
                    meta.title
                );
            }
            println!();
            println!("Use 'orderfix explain <key>' for details.");
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&metas).context("serialize policies")?
            );
        }
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "orderfix".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: None,
    }
}
