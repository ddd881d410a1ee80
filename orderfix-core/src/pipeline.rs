//! Core check and fix pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: snapshots come from a [`SnapshotSource`] and every write
//! goes through a [`WritePort`].

use crate::ports::{SnapshotSource, WritePort};
use crate::settings::{CheckSettings, FixSettings};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use orderfix_domain::{PolicyConfig, PolicyRegistry, detect, diagnose};
use orderfix_edit::{RewriteOptions, WriteOutcome, render_patch, try_rewrite};
use orderfix_render::{render_outline, render_report_md};
use orderfix_snapshots::{LoadedSnapshot, serialize_snapshot, sha256_hex};
use orderfix_types::container::Container;
use orderfix_types::report::{
    Diagnostic, OrderfixReport, ReportArtifacts, ReportCounts, ReportLocation, RunInfo, Severity,
    ToolInfo, Verdict,
};
use orderfix_types::snapshot::Snapshot;
use orderfix_types::wire::ReportV1;
use rayon::iter::{
    IndexedParallelIterator, IntoParallelIterator, IntoParallelRefIterator, ParallelIterator,
};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Files loaded into one parallel batch; work inside a batch is spread per container.
const FILE_BATCH_SIZE: usize = 64;

/// Rule id of the diagnostic emitted for a snapshot that failed to load.
pub const SNAPSHOT_LOAD_RULE: &str = "inputs.snapshot_load_failed";

/// Error type for pipeline results. Exit code 2 = policy block, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("policy block")]
    PolicyBlock,
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::PolicyBlock => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// Outcome of `run_check`.
pub struct CheckOutcome {
    pub report: OrderfixReport,

    /// Warn-level diagnostics remain.
    pub policy_block: bool,
}

/// One snapshot after the fix loop.
#[derive(Debug, Clone)]
pub struct FixedSnapshot {
    /// Snapshot document as read.
    pub path: Utf8PathBuf,

    /// Path under the snapshot root, used for `fixed/<file>`.
    pub relative: Utf8PathBuf,
    pub sha256_before: Option<String>,
    pub sha256_after: Option<String>,

    /// Serialized rewrite; `None` when nothing moved.
    pub contents: Option<String>,
    pub moves: usize,
}

impl FixedSnapshot {
    pub fn changed(&self) -> bool {
        self.contents.is_some()
    }
}

/// Outcome of `run_fix`.
pub struct FixOutcome {
    pub report: OrderfixReport,
    pub snapshots: Vec<FixedSnapshot>,

    /// Unified diff of the outline rendering, before vs after.
    pub outline_diff: String,
    pub policy_block: bool,
}

/// Result of writing fixed snapshots back over their inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBack {
    pub written: Vec<Utf8PathBuf>,

    /// Inputs that changed on disk after they were read; left untouched.
    pub stale: Vec<Utf8PathBuf>,
}

pub fn build_registry(allow: &[String], deny: &[String], config: &PolicyConfig) -> PolicyRegistry {
    PolicyRegistry::builtin(config).filtered(allow, deny)
}

/// Run the check pipeline: diagnose every container of every snapshot.
pub fn run_check(
    settings: &CheckSettings,
    source: &dyn SnapshotSource,
    tool: ToolInfo,
) -> Result<CheckOutcome, ToolError> {
    let started = Utc::now();
    let snapshots = source.load_snapshots()?;
    let registry = build_registry(&settings.allow, &settings.deny, &settings.policy);
    debug!(
        snapshots = snapshots.len(),
        policies = registry.len(),
        "running check"
    );

    let mut diagnostics = load_failures(&snapshots);
    for batch in snapshots.chunks(FILE_BATCH_SIZE) {
        let found = containers_of(batch)
            .par_iter()
            .map(|(_, container)| diagnose(container, &registry))
            .collect::<Vec<_>>();
        diagnostics.extend(found.into_iter().flatten());
    }
    sort_diagnostics(&mut diagnostics);

    let reasons = partial_inputs_reason(&snapshots);
    let report = build_report(
        tool,
        started,
        diagnostics,
        0,
        reasons,
        ReportArtifacts {
            markdown: Some("report.md".to_string()),
            patch: None,
            fixed_dir: None,
        },
        None,
    );
    let policy_block = report.verdict.counts.warn > 0 || report.verdict.counts.error > 0;

    Ok(CheckOutcome {
        report,
        policy_block,
    })
}

/// Write `report.json` and `report.md`.
pub fn write_check_artifacts(
    outcome: &CheckOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_report(&outcome.report, out_dir, writer)
}

/// Run the fix pipeline: rewrite containers until they settle, then report what remains.
pub fn run_fix(
    settings: &FixSettings,
    source: &dyn SnapshotSource,
    tool: ToolInfo,
) -> Result<FixOutcome, ToolError> {
    let started = Utc::now();
    let snapshots = source.load_snapshots()?;
    let registry = build_registry(&settings.allow, &settings.deny, &settings.policy);
    debug!(
        snapshots = snapshots.len(),
        policies = registry.len(),
        max_passes = settings.max_passes,
        "running fix"
    );

    let mut diagnostics = load_failures(&snapshots);
    let mut fixed = Vec::new();
    let mut outlines_before = BTreeMap::new();
    let mut outlines_after = BTreeMap::new();

    for batch in snapshots.chunks(FILE_BATCH_SIZE) {
        let mut settled: Vec<Vec<SettledContainer>> = batch.iter().map(|_| Vec::new()).collect();
        let units = containers_of(batch)
            .par_iter()
            .map(|&(file, container)| {
                let (container, moves) =
                    fix_container(container, &registry, &settings.rewrite, settings.max_passes);
                let diagnostics = diagnose(&container, &registry);
                (
                    file,
                    SettledContainer {
                        container,
                        moves,
                        diagnostics,
                    },
                )
            })
            .collect::<Vec<_>>();
        for (file, unit) in units {
            settled[file].push(unit);
        }

        let outcomes = batch
            .par_iter()
            .zip(settled.into_par_iter())
            .map(|(loaded, settled)| -> anyhow::Result<Option<SnapshotFix>> {
                let Ok(snapshot) = &loaded.snapshot else {
                    return Ok(None);
                };
                fix_snapshot(settings, loaded, snapshot, settled).map(Some)
            })
            .collect::<Vec<_>>();

        for outcome in outcomes {
            let Some(outcome) = outcome? else {
                continue;
            };
            outlines_before.insert(outcome.fixed.relative.clone(), outcome.outline_before);
            outlines_after.insert(outcome.fixed.relative.clone(), outcome.outline_after);
            diagnostics.extend(outcome.diagnostics);
            fixed.push(outcome.fixed);
        }
    }
    sort_diagnostics(&mut diagnostics);

    let outline_diff = render_patch(&outlines_before, &outlines_after);
    let moves: usize = fixed.iter().map(|f| f.moves).sum();
    let files: Vec<serde_json::Value> = fixed
        .iter()
        .map(|f| {
            serde_json::json!({
                "path": f.relative,
                "sha256_before": f.sha256_before,
                "sha256_after": f.sha256_after,
                "moves": f.moves,
            })
        })
        .collect();
    let data = serde_json::json!({
        "orderfix": {
            "fix": {
                "max_passes": settings.max_passes,
                "moves": moves,
                "files_changed": fixed.iter().filter(|f| f.changed()).count(),
            }
        },
        "files": files,
    });

    let reasons = partial_inputs_reason(&snapshots);
    let report = build_report(
        tool,
        started,
        diagnostics,
        moves as u64,
        reasons,
        ReportArtifacts {
            markdown: Some("report.md".to_string()),
            patch: Some("outline.diff".to_string()),
            fixed_dir: Some("fixed".to_string()),
        },
        Some(data),
    );
    let policy_block = report.verdict.counts.warn > 0 || report.verdict.counts.error > 0;

    Ok(FixOutcome {
        report,
        snapshots: fixed,
        outline_diff,
        policy_block,
    })
}

/// Write `fixed/<file>` for every changed snapshot, plus `outline.diff`, `report.json` and
/// `report.md`.
pub fn write_fix_artifacts(
    outcome: &FixOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let fixed_dir = out_dir.join("fixed");
    for snapshot in &outcome.snapshots {
        if let Some(contents) = &snapshot.contents {
            writer.write_file(&fixed_dir.join(&snapshot.relative), contents.as_bytes())?;
        }
    }

    writer.write_file(
        &out_dir.join("outline.diff"),
        outcome.outline_diff.as_bytes(),
    )?;
    write_report(&outcome.report, out_dir, writer)
}

/// Overwrite changed snapshot inputs, skipping any whose bytes changed since they were read.
pub fn write_back_snapshots(
    outcome: &FixOutcome,
    writer: &dyn WritePort,
) -> anyhow::Result<WriteBack> {
    let mut result = WriteBack::default();

    for snapshot in &outcome.snapshots {
        let Some(contents) = &snapshot.contents else {
            continue;
        };
        let Some(expected) = &snapshot.sha256_before else {
            warn!(path = %snapshot.path, "no sha256 recorded at load; not overwriting");
            result.stale.push(snapshot.path.clone());
            continue;
        };

        match writer.replace_if_unchanged(&snapshot.path, expected, contents)? {
            WriteOutcome::Written => {
                info!(path = %snapshot.path, moves = snapshot.moves, "wrote fixed snapshot");
                result.written.push(snapshot.path.clone());
            }
            WriteOutcome::Unchanged => {}
            WriteOutcome::Stale { expected, actual } => {
                warn!(
                    path = %snapshot.path,
                    expected = %expected,
                    actual = %actual,
                    "snapshot changed since it was read; not overwriting"
                );
                result.stale.push(snapshot.path.clone());
            }
        }
    }

    Ok(result)
}

/// Detect and rewrite until a pass leaves the container unchanged or `max_passes` is reached.
/// Each pass applies at most one move per policy.
///
/// A pass that returns the container to a state seen at the start of an earlier pass means
/// policies are undoing each other; the loop stops at that state. The returned move count is
/// the number of moves that led to the returned container, so it is zero whenever the result
/// equals the input.
pub fn fix_container(
    container: &Container,
    registry: &PolicyRegistry,
    options: &RewriteOptions,
    max_passes: usize,
) -> (Container, usize) {
    let mut current = container.clone();
    let mut moves = 0;
    // Container at the start of every pass, with the moves applied to reach it.
    let mut seen: Vec<(Container, usize)> = Vec::new();

    for pass in 0..max_passes {
        seen.push((current.clone(), moves));
        for policy in registry.iter() {
            let Some(violation) = detect(&current, policy) else {
                continue;
            };
            if !violation.fix.is_available() {
                continue;
            }
            match try_rewrite(&current, &violation, options) {
                Ok(next) if next != current => {
                    current = next;
                    moves += 1;
                }
                Ok(_) => {}
                Err(err) => debug!(
                    container = %current.name,
                    rule = %violation.rule_id,
                    error = %err,
                    "fix refused"
                ),
            }
        }

        if let Some((_, before)) = seen.iter().find(|(state, _)| *state == current) {
            if *before != moves {
                warn!(
                    container = %current.name,
                    pass,
                    "policies undo each other; stopping at a repeated order"
                );
            }
            moves = *before;
            debug!(container = %current.name, pass, moves, "container settled");
            break;
        }
    }

    if current == *container {
        moves = 0;
    }
    (current, moves)
}

// ── helpers ─────────────────────────────────────────────────────────────

struct SnapshotFix {
    fixed: FixedSnapshot,
    outline_before: String,
    outline_after: String,
    diagnostics: Vec<Diagnostic>,
}

/// One container after the fix loop, with what still fails on it.
struct SettledContainer {
    container: Container,
    moves: usize,
    diagnostics: Vec<Diagnostic>,
}

/// Every container of the loaded snapshots in `batch`, paired with its file's index in the
/// batch. Order follows the batch, then the snapshot.
fn containers_of(batch: &[LoadedSnapshot]) -> Vec<(usize, &Container)> {
    batch
        .iter()
        .enumerate()
        .filter_map(|(file, loaded)| loaded.snapshot.as_ref().ok().map(|s| (file, s)))
        .flat_map(|(file, snapshot)| snapshot.containers.iter().map(move |c| (file, c)))
        .collect()
}

/// Reassemble one file from its settled containers, which arrive in snapshot order.
fn fix_snapshot(
    settings: &FixSettings,
    loaded: &LoadedSnapshot,
    snapshot: &Snapshot,
    settled: Vec<SettledContainer>,
) -> anyhow::Result<SnapshotFix> {
    let mut next = snapshot.clone();
    let mut moves = 0;
    let mut diagnostics = Vec::new();
    next.containers.clear();
    for unit in settled {
        next.containers.push(unit.container);
        moves += unit.moves;
        diagnostics.extend(unit.diagnostics);
    }

    let (contents, sha256_after) = if next != *snapshot {
        let contents = serialize_snapshot(loaded.format, &next)
            .with_context(|| format!("serialize {}", loaded.path))?;
        let sha = sha256_hex(contents.as_bytes());
        (Some(contents), Some(sha))
    } else {
        (None, loaded.sha256.clone())
    };

    let relative = loaded
        .path
        .strip_prefix(&settings.snapshots_dir)
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|_| {
            Utf8PathBuf::from(loaded.path.file_name().unwrap_or(loaded.path.as_str()))
        });

    Ok(SnapshotFix {
        outline_before: render_outline(snapshot),
        outline_after: render_outline(&next),
        diagnostics,
        fixed: FixedSnapshot {
            path: loaded.path.clone(),
            relative,
            sha256_before: loaded.sha256.clone(),
            sha256_after,
            contents,
            moves,
        },
    })
}

fn load_failures(snapshots: &[LoadedSnapshot]) -> Vec<Diagnostic> {
    snapshots
        .iter()
        .filter_map(|loaded| {
            let err = loaded.snapshot.as_ref().err()?;
            Some(Diagnostic {
                rule_id: SNAPSHOT_LOAD_RULE.to_string(),
                severity: Severity::Warn,
                container: String::new(),
                message: format!("Snapshot failed to load: {} ({})", loaded.path, err),
                location: ReportLocation {
                    path: loaded.path.to_string(),
                    line: None,
                },
                fixable: false,
                expected_order: Vec::new(),
                fingerprint: Some(format!("inputs/snapshot_load_failed/{}", loaded.path)),
            })
        })
        .collect()
}

fn partial_inputs_reason(snapshots: &[LoadedSnapshot]) -> Vec<String> {
    if snapshots.iter().any(|s| s.snapshot.is_err()) {
        vec!["partial_inputs".to_string()]
    } else {
        Vec::new()
    }
}

/// File, line, rule, then container and message for full determinism.
fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then_with(|| a.container.cmp(&b.container))
            .then_with(|| a.message.cmp(&b.message))
    });
}

fn build_report(
    tool: ToolInfo,
    started: DateTime<Utc>,
    diagnostics: Vec<Diagnostic>,
    fixed: u64,
    reasons: Vec<String>,
    artifacts: ReportArtifacts,
    data: Option<serde_json::Value>,
) -> OrderfixReport {
    let ended = Utc::now();
    let mut counts = ReportCounts::tally(&diagnostics);
    counts.fixed = fixed;
    let duration_ms = u64::try_from((ended - started).num_milliseconds()).unwrap_or(0);

    OrderfixReport {
        schema: orderfix_types::schema::ORDERFIX_REPORT_V1.to_string(),
        tool,
        run: RunInfo {
            started_at: started.to_rfc3339(),
            ended_at: Some(ended.to_rfc3339()),
            duration_ms: Some(duration_ms),
        },
        verdict: Verdict {
            status: counts.status(),
            counts,
            reasons,
        },
        diagnostics,
        artifacts: Some(artifacts),
        data,
    }
}

fn write_report(
    report: &OrderfixReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    let wire = ReportV1::from(report);
    let json = serde_json::to_string_pretty(&wire).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), json.as_bytes())?;

    let md = render_report_md(report);
    writer.write_file(&out_dir.join("report.md"), md.as_bytes())?;
    info!(out_dir = %out_dir, "wrote report artifacts");
    Ok(())
}
