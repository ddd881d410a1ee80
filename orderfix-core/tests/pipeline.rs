//! Check and fix pipelines over in-memory and on-disk snapshots.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use orderfix_core::adapters::{FsSnapshotSource, FsWritePort, InMemorySnapshotSource};
use orderfix_core::pipeline::{
    SNAPSHOT_LOAD_RULE, run_check, run_fix, write_back_snapshots, write_check_artifacts,
    write_fix_artifacts,
};
use orderfix_core::ports::WritePort;
use orderfix_core::settings::{CheckSettings, FixSettings};
use orderfix_core::{LoadedSnapshot, SnapshotFormat, SnapshotLoadError};
use orderfix_edit::{WriteOutcome, sha256_hex};
use orderfix_snapshots::parse_snapshot;
use orderfix_types::report::{ReportStatus, Severity, ToolInfo};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Mutex;

const UNSORTED: &str = r#"{
  "schema": "orderfix.snapshot.v1",
  "path": "src/Widget.cs",
  "containers": [
    {
      "name": "Widget",
      "line": 1,
      "members": [
        {
          "name": "Foo",
          "kind": "method",
          "params": [{ "type_name": "int" }],
          "accessibility": "public",
          "line": 3,
          "decor": { "doc_comment": "/// Takes an int." }
        },
        {
          "name": "Foo",
          "kind": "method",
          "accessibility": "public",
          "line": 8,
          "decor": { "doc_comment": "/// Takes nothing.", "leading_blank_lines": 1 }
        }
      ]
    }
  ]
}
"#;

const SORTED: &str = r#"{
  "schema": "orderfix.snapshot.v1",
  "path": "src/Clean.cs",
  "containers": [
    { "name": "Clean", "members": [ { "name": "Run", "kind": "method", "accessibility": "public" } ] }
  ]
}
"#;

const DISPOSE_PATTERN: &str = r#"{
  "schema": "orderfix.snapshot.v1",
  "path": "src/Resource.cs",
  "containers": [
    {
      "name": "Resource",
      "base_list": [{ "name": "IDisposable", "kind": "interface" }],
      "members": [
        { "name": "Dispose", "kind": "method", "params": [{ "name": "disposing", "type_name": "bool" }], "accessibility": "protected", "line": 3 },
        { "name": "Resource", "kind": "constructor", "accessibility": "public", "line": 8 },
        { "name": "Dispose", "kind": "method", "accessibility": "public", "line": 12 }
      ]
    }
  ]
}
"#;

const SEVERAL_CONTAINERS: &str = r#"{
  "schema": "orderfix.snapshot.v1",
  "path": "src/Shapes.cs",
  "containers": [
    {
      "name": "Circle",
      "members": [
        { "name": "Scale", "kind": "method", "params": [{ "type_name": "double" }], "accessibility": "public", "line": 3 },
        { "name": "Scale", "kind": "method", "accessibility": "public", "line": 5 }
      ]
    },
    { "name": "Point", "members": [ { "name": "Move", "kind": "method", "accessibility": "public", "line": 9 } ] },
    {
      "name": "Square",
      "members": [
        { "name": "Grow", "kind": "method", "params": [{ "type_name": "int" }, { "type_name": "int" }], "accessibility": "public", "line": 13 },
        { "name": "Grow", "kind": "method", "params": [{ "type_name": "int" }], "accessibility": "public", "line": 15 }
      ]
    }
  ]
}
"#;

fn tool() -> ToolInfo {
    ToolInfo {
        name: "orderfix".into(),
        version: "0.1.0".into(),
        commit: None,
    }
}

fn loaded(path: &str, contents: &str) -> LoadedSnapshot {
    LoadedSnapshot {
        path: Utf8PathBuf::from(path),
        format: SnapshotFormat::Json,
        sha256: Some(sha256_hex(contents.as_bytes())),
        snapshot: parse_snapshot(SnapshotFormat::Json, contents),
    }
}

fn broken(path: &str) -> LoadedSnapshot {
    LoadedSnapshot {
        path: Utf8PathBuf::from(path),
        format: SnapshotFormat::Json,
        sha256: None,
        snapshot: Err(SnapshotLoadError::Parse {
            message: "expected value".into(),
        }),
    }
}

fn source(snapshots: Vec<LoadedSnapshot>) -> InMemorySnapshotSource {
    InMemorySnapshotSource::new(snapshots)
}

fn fix_settings() -> FixSettings {
    FixSettings {
        snapshots_dir: Utf8PathBuf::from("snapshots"),
        ..FixSettings::default()
    }
}

#[derive(Default)]
struct MemWritePort {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemWritePort {
    fn seed(&self, path: &str, contents: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.as_bytes().to_vec());
    }

    fn read(&self, path: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|b| String::from_utf8_lossy(b).to_string())
    }
}

impl WritePort for MemWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, _path: &Utf8Path) -> anyhow::Result<()> {
        Ok(())
    }

    fn replace_if_unchanged(
        &self,
        path: &Utf8Path,
        expected_sha256: &str,
        contents: &str,
    ) -> anyhow::Result<WriteOutcome> {
        let mut files = self.files.lock().unwrap();
        let current = files.get(path.as_str()).context("missing file")?;
        let actual = sha256_hex(current);
        if actual != expected_sha256 {
            return Ok(WriteOutcome::Stale {
                expected: expected_sha256.to_string(),
                actual,
            });
        }
        files.insert(path.to_string(), contents.as_bytes().to_vec());
        Ok(WriteOutcome::Written)
    }
}

#[test]
fn check_reports_misordered_overloads() {
    let src = source(vec![
        loaded("snapshots/Widget.json", UNSORTED),
        loaded("snapshots/Clean.json", SORTED),
    ]);
    let outcome = run_check(&CheckSettings::default(), &src, tool()).unwrap();

    assert!(outcome.policy_block);
    assert_eq!(outcome.report.verdict.status, ReportStatus::Warn);
    let rules: Vec<&str> = outcome
        .report
        .diagnostics
        .iter()
        .map(|d| d.rule_id.as_str())
        .collect();
    assert_eq!(rules, vec!["order.overloads_sorted"]);

    let d = &outcome.report.diagnostics[0];
    assert_eq!(d.location.path, "src/Widget.cs");
    assert_eq!(d.location.line, Some(8));
    assert!(d.fixable);
    assert_eq!(d.expected_order, vec!["Foo()", "Foo(int)"]);
}

#[test]
fn clean_snapshots_pass() {
    let src = source(vec![loaded("snapshots/Clean.json", SORTED)]);
    let outcome = run_check(&CheckSettings::default(), &src, tool()).unwrap();
    assert!(!outcome.policy_block);
    assert_eq!(outcome.report.verdict.status, ReportStatus::Pass);
    assert!(outcome.report.diagnostics.is_empty());
}

#[test]
fn denied_policy_is_not_reported() {
    let src = source(vec![loaded("snapshots/Widget.json", UNSORTED)]);
    let settings = CheckSettings {
        deny: vec!["order.overloads_*".to_string()],
        ..CheckSettings::default()
    };
    let outcome = run_check(&settings, &src, tool()).unwrap();
    assert!(outcome.report.diagnostics.is_empty());
}

#[test]
fn broken_snapshot_is_a_partial_input() {
    let src = source(vec![
        broken("snapshots/Bad.json"),
        loaded("snapshots/Clean.json", SORTED),
    ]);
    let outcome = run_check(&CheckSettings::default(), &src, tool()).unwrap();

    assert_eq!(outcome.report.verdict.reasons, vec!["partial_inputs"]);
    let d = &outcome.report.diagnostics[0];
    assert_eq!(d.rule_id, SNAPSHOT_LOAD_RULE);
    assert_eq!(d.severity, Severity::Warn);
    assert!(!d.fixable);
}

#[test]
fn check_artifacts_are_written() {
    let src = source(vec![loaded("snapshots/Widget.json", UNSORTED)]);
    let outcome = run_check(&CheckSettings::default(), &src, tool()).unwrap();
    let writer = MemWritePort::default();
    write_check_artifacts(&outcome, Utf8Path::new("out"), &writer).unwrap();

    let json = writer.read("out/report.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["schema"], "orderfix.report.v1");
    assert_eq!(value["verdict"]["status"], "warn");
    assert!(writer.read("out/report.md").unwrap().contains("order.overloads_sorted"));
}

#[test]
fn fix_sorts_overloads_and_reports_no_remaining_warnings() {
    let src = source(vec![
        loaded("snapshots/Widget.json", UNSORTED),
        loaded("snapshots/Clean.json", SORTED),
    ]);
    let outcome = run_fix(&fix_settings(), &src, tool()).unwrap();

    assert!(!outcome.policy_block);
    assert_eq!(outcome.report.verdict.counts.fixed, 1);
    assert!(outcome.report.diagnostics.is_empty());

    let widget = outcome
        .snapshots
        .iter()
        .find(|s| s.relative == "Widget.json")
        .unwrap();
    assert!(widget.changed());
    assert_ne!(widget.sha256_before, widget.sha256_after);

    let clean = outcome
        .snapshots
        .iter()
        .find(|s| s.relative == "Clean.json")
        .unwrap();
    assert!(!clean.changed());
    assert_eq!(clean.sha256_before, clean.sha256_after);

    let fixed = parse_snapshot(SnapshotFormat::Json, widget.contents.as_deref().unwrap()).unwrap();
    assert_eq!(fixed.containers[0].signatures(), vec!["Foo()", "Foo(int)"]);
    let docs: Vec<_> = fixed.containers[0]
        .siblings()
        .iter()
        .map(|s| s.decor.doc_comment.clone().unwrap_or_default())
        .collect();
    assert_eq!(docs, vec!["/// Takes nothing.", "/// Takes an int."]);

    assert!(outcome.outline_diff.contains("diff --git a/Widget.json b/Widget.json"));
    assert!(!outcome.outline_diff.contains("Clean.json"));
}

#[test]
fn dispose_pattern_converges_in_one_move() {
    let src = source(vec![loaded("snapshots/Resource.json", DISPOSE_PATTERN)]);
    let outcome = run_fix(&fix_settings(), &src, tool()).unwrap();

    assert!(!outcome.policy_block);
    assert!(outcome.report.diagnostics.is_empty());
    assert_eq!(outcome.report.verdict.counts.fixed, 1);

    let resource = &outcome.snapshots[0];
    assert_eq!(resource.moves, 1);
    let fixed =
        parse_snapshot(SnapshotFormat::Json, resource.contents.as_deref().unwrap()).unwrap();
    assert_eq!(
        fixed.containers[0].signatures(),
        vec!["Resource()", "Dispose()", "Dispose(bool)"]
    );

    // The settled file is left alone on the next run.
    let again = source(vec![loaded(
        "snapshots/Resource.json",
        resource.contents.as_deref().unwrap(),
    )]);
    let outcome = run_fix(&fix_settings(), &again, tool()).unwrap();
    assert!(!outcome.snapshots[0].changed());
    assert_eq!(outcome.snapshots[0].moves, 0);
    assert_eq!(outcome.report.verdict.counts.fixed, 0);
    assert!(outcome.outline_diff.is_empty());
}

#[test]
fn containers_of_one_file_are_checked_and_fixed_independently() {
    let src = source(vec![
        loaded("snapshots/Shapes.json", SEVERAL_CONTAINERS),
        loaded("snapshots/Widget.json", UNSORTED),
    ]);
    let check = run_check(&CheckSettings::default(), &src, tool()).unwrap();
    let containers: Vec<_> = check
        .report
        .diagnostics
        .iter()
        .map(|d| d.container.as_str())
        .collect();
    assert_eq!(containers, vec!["Circle", "Square", "Widget"]);

    let outcome = run_fix(&fix_settings(), &src, tool()).unwrap();
    assert!(outcome.report.diagnostics.is_empty());
    assert_eq!(outcome.report.verdict.counts.fixed, 3);

    let shapes = outcome
        .snapshots
        .iter()
        .find(|s| s.relative == "Shapes.json")
        .unwrap();
    assert_eq!(shapes.moves, 2);
    let fixed = parse_snapshot(SnapshotFormat::Json, shapes.contents.as_deref().unwrap()).unwrap();
    let names: Vec<_> = fixed.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Circle", "Point", "Square"]);
    assert_eq!(fixed.containers[0].signatures(), vec!["Scale()", "Scale(double)"]);
    assert_eq!(fixed.containers[1].signatures(), vec!["Move()"]);
    assert_eq!(fixed.containers[2].signatures(), vec!["Grow(int)", "Grow(int, int)"]);
}

#[test]
fn fix_artifacts_include_fixed_snapshots_and_outline_diff() {
    let src = source(vec![loaded("snapshots/Widget.json", UNSORTED)]);
    let outcome = run_fix(&fix_settings(), &src, tool()).unwrap();
    let writer = MemWritePort::default();
    write_fix_artifacts(&outcome, Utf8Path::new("out"), &writer).unwrap();

    assert!(writer.read("out/fixed/Widget.json").is_some());
    assert!(writer.read("out/outline.diff").unwrap().contains("+"));
    let report = writer.read("out/report.md").unwrap();
    assert!(report.contains("- Fixed: 1"));
    assert!(report.contains("`Widget.json`"));
}

#[test]
fn write_back_respects_preconditions() {
    let src = source(vec![loaded("snapshots/Widget.json", UNSORTED)]);
    let outcome = run_fix(&fix_settings(), &src, tool()).unwrap();

    let writer = MemWritePort::default();
    writer.seed("snapshots/Widget.json", UNSORTED);
    let result = write_back_snapshots(&outcome, &writer).unwrap();
    assert_eq!(result.written, vec![Utf8PathBuf::from("snapshots/Widget.json")]);
    assert!(result.stale.is_empty());

    let stale_writer = MemWritePort::default();
    stale_writer.seed("snapshots/Widget.json", "edited in the meantime");
    let result = write_back_snapshots(&outcome, &stale_writer).unwrap();
    assert_eq!(result.stale, vec![Utf8PathBuf::from("snapshots/Widget.json")]);
    assert_eq!(
        stale_writer.read("snapshots/Widget.json").as_deref(),
        Some("edited in the meantime")
    );
}

#[test]
fn fix_then_check_on_disk_converges() {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().join("snapshots")).unwrap();
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("Widget.json"), UNSORTED).unwrap();

    let settings = FixSettings {
        snapshots_dir: root.clone(),
        ..FixSettings::default()
    };
    let fs_source = FsSnapshotSource::new(root.clone());
    let outcome = run_fix(&settings, &fs_source, tool()).unwrap();
    let written = write_back_snapshots(&outcome, &FsWritePort).unwrap();
    assert_eq!(written.written.len(), 1);

    let check = run_check(&settings.check_settings(), &fs_source, tool()).unwrap();
    assert_eq!(check.report.verdict.status, ReportStatus::Pass);
}
