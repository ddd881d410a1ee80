//! Rendering helpers (markdown and outline text) for human-readable artifacts.
//!
//! The outline is a preview of a snapshot's layout: doc comments, blank lines, region markers and
//! member signatures in sibling order. It is what `outline.diff` is computed over.

use orderfix_types::container::{Container, ContainerKind};
use orderfix_types::decor::Decoration;
use orderfix_types::model::{DeclKind, Declaration};
use orderfix_types::report::{Diagnostic, OrderfixReport, ReportStatus, Severity};
use orderfix_types::snapshot::Snapshot;

const INDENT: &str = "    ";

pub fn render_report_md(report: &OrderfixReport) -> String {
    let counts = &report.verdict.counts;
    let mut out = String::new();
    out.push_str("# orderfix report\n\n");
    out.push_str(&format!(
        "- Status: `{}`\n",
        status_label(report.verdict.status)
    ));
    out.push_str(&format!(
        "- Diagnostics: {} (warn {}, info {}, error {})\n",
        counts.info + counts.warn + counts.error,
        counts.warn,
        counts.info,
        counts.error
    ));
    if counts.fixed > 0 {
        out.push_str(&format!("- Fixed: {}\n", counts.fixed));
    }
    for reason in &report.verdict.reasons {
        out.push_str(&format!("- Reason: {}\n", reason));
    }
    out.push('\n');

    out.push_str("## Diagnostics\n\n");
    if report.diagnostics.is_empty() {
        out.push_str("_No diagnostics._\n");
    } else {
        for (i, d) in report.diagnostics.iter().enumerate() {
            render_diagnostic(&mut out, i + 1, d);
        }
    }

    let files = changed_files(report);
    if !files.is_empty() {
        out.push_str("\n## Files changed\n\n");
        for (path, before, after) in files {
            out.push_str(&format!("- `{}` {} → {}\n", path, before, after));
        }
    }

    out
}

fn render_diagnostic(out: &mut String, n: usize, d: &Diagnostic) {
    out.push_str(&format!("### {}. {}\n\n", n, d.rule_id));
    out.push_str(&format!("- Severity: `{}`\n", severity_label(d.severity)));
    out.push_str(&format!("- Container: `{}`\n", d.container));
    let loc = match d.location.line {
        Some(line) => format!("{}:{}", d.location.path, line),
        None => d.location.path.clone(),
    };
    out.push_str(&format!("- Location: {}\n", loc));
    out.push_str(&format!("- Fixable: `{}`\n", d.fixable));
    out.push_str(&format!("\n{}\n", d.message));

    if !d.expected_order.is_empty() {
        out.push_str("\n**Expected order**\n\n");
        for (i, sig) in d.expected_order.iter().enumerate() {
            out.push_str(&format!("{}. `{}`\n", i + 1, sig));
        }
    }
    out.push('\n');
}

/// `(path, sha256_before, sha256_after)` from the report's `data.files`, when present.
fn changed_files(report: &OrderfixReport) -> Vec<(String, String, String)> {
    let Some(files) = report
        .data
        .as_ref()
        .and_then(|d| d.get("files"))
        .and_then(|f| f.as_array())
    else {
        return Vec::new();
    };

    let field = |v: &serde_json::Value, key: &str| {
        v.get(key)
            .and_then(|s| s.as_str())
            .unwrap_or("-")
            .to_string()
    };
    files
        .iter()
        .filter(|f| f.get("sha256_before") != f.get("sha256_after"))
        .map(|f| {
            (
                field(f, "path"),
                field(f, "sha256_before"),
                field(f, "sha256_after"),
            )
        })
        .collect()
}

/// Outline of every container in the snapshot, separated by a blank line.
pub fn render_outline(snapshot: &Snapshot) -> String {
    let mut out = format!("// {}\n", snapshot.path);
    for container in &snapshot.containers {
        out.push('\n');
        out.push_str(&render_container_outline(container));
    }
    out
}

pub fn render_container_outline(container: &Container) -> String {
    let mut out = String::new();
    for attr in &container.attributes {
        out.push_str(&format!("[{}]\n", attr));
    }
    out.push_str(&format!(
        "{} {}",
        container_keyword(container.kind),
        container.name
    ));
    if !container.base_list.is_empty() {
        let bases: Vec<&str> = container.base_list.iter().map(|b| b.name.as_str()).collect();
        out.push_str(&format!(" : {}", bases.join(", ")));
    }
    out.push_str("\n{\n");

    let mut prev: Option<&Decoration> = None;
    for sibling in container.siblings() {
        let Some(decl) = container.decl(sibling.id) else {
            continue;
        };
        let decor = &sibling.decor;
        if let Some(p) = prev {
            let gap = p.trailing_blank_lines.max(decor.leading_blank_lines);
            for _ in 0..gap {
                out.push('\n');
            }
        }
        render_member(&mut out, decl, decor);
        prev = Some(decor);
    }

    out.push_str("}\n");
    out
}

fn render_member(out: &mut String, decl: &Declaration, decor: &Decoration) {
    for open in &decor.region_opens {
        out.push_str(&format!("{INDENT}#region {}\n", open.label));
    }
    if let Some(doc) = &decor.doc_comment {
        for line in doc.lines() {
            out.push_str(&format!("{INDENT}{}\n", line.trim_end()));
        }
    }
    for attr in &decl.attributes {
        out.push_str(&format!("{INDENT}[{}]\n", attr));
    }
    out.push_str(&format!("{INDENT}{}\n", member_line(decl)));
    for close in &decor.region_closes {
        match &close.label {
            Some(label) => out.push_str(&format!("{INDENT}#endregion {}\n", label)),
            None => out.push_str(&format!("{INDENT}#endregion\n")),
        }
    }
}

fn member_line(decl: &Declaration) -> String {
    let mut words = vec![decl.accessibility.keyword()];
    if let DeclKind::Field {
        is_const,
        is_readonly,
        ..
    } = &decl.kind
    {
        if *is_const {
            words.push("const");
        } else {
            if decl.is_static {
                words.push("static");
            }
            if *is_readonly {
                words.push("readonly");
            }
        }
    } else if decl.is_static {
        words.push("static");
    }
    if decl.symbol.is_override {
        words.push("override");
    }
    words.push(decl.kind.label());
    format!("{} {}", words.join(" "), decl.signature())
}

fn container_keyword(kind: ContainerKind) -> &'static str {
    match kind {
        ContainerKind::Class => "class",
        ContainerKind::Struct => "struct",
        ContainerKind::Record => "record",
        ContainerKind::Interface => "interface",
    }
}

fn status_label(s: ReportStatus) -> &'static str {
    match s {
        ReportStatus::Pass => "pass",
        ReportStatus::Warn => "warn",
        ReportStatus::Fail => "fail",
    }
}

fn severity_label(s: Severity) -> &'static str {
    match s {
        Severity::Info => "info",
        Severity::Warn => "warn",
        Severity::Error => "error",
    }
}
