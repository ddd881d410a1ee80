use orderfix_render::{render_container_outline, render_outline, render_report_md};
use orderfix_types::container::{BaseType, Container, ContainerKind};
use orderfix_types::decor::Decoration;
use orderfix_types::model::{Accessibility, DeclKind, Declaration, Location, Param};
use orderfix_types::report::{
    Diagnostic, OrderfixReport, ReportCounts, ReportLocation, ReportStatus, RunInfo, Severity,
    ToolInfo, Verdict,
};
use orderfix_types::snapshot::Snapshot;
use pretty_assertions::assert_eq;

fn method(name: &str, types: &[&str]) -> Declaration {
    Declaration::new(
        name,
        DeclKind::Method {
            params: types
                .iter()
                .map(|t| Param {
                    name: String::new(),
                    type_name: (*t).to_string(),
                    variadic: false,
                })
                .collect(),
        },
    )
    .with_accessibility(Accessibility::Public)
}

fn report(diagnostics: Vec<Diagnostic>, data: Option<serde_json::Value>) -> OrderfixReport {
    let counts = ReportCounts::tally(&diagnostics);
    OrderfixReport {
        schema: "orderfix.report.v1".into(),
        tool: ToolInfo {
            name: "orderfix".into(),
            version: "0.1.0".into(),
            commit: None,
        },
        run: RunInfo {
            started_at: "2026-01-01T00:00:00Z".into(),
            ended_at: None,
            duration_ms: None,
        },
        verdict: Verdict {
            status: counts.status(),
            counts,
            reasons: Vec::new(),
        },
        diagnostics,
        artifacts: None,
        data,
    }
}

#[test]
fn outline_shows_markers_docs_and_gaps() {
    let mut c = Container::new("Widget", ContainerKind::Class, Location::default());
    c.base_list.push(BaseType::interface("IDisposable"));
    c.push(
        method("Foo", &["int"]),
        Decoration::default()
            .with_doc("/// <summary>Foo.</summary>")
            .open("Overloads"),
    );
    c.push(
        method("Foo", &[]).with_static(true),
        Decoration::default().with_blank_lines(1, 0).close(),
    );
    c.push(
        method("Dispose", &[]),
        Decoration::default().with_blank_lines(0, 0),
    );

    let expected = "\
class Widget : IDisposable
{
    #region Overloads
    /// <summary>Foo.</summary>
    public method Foo(int)

    public static method Foo()
    #endregion
    public method Dispose()
}
";
    assert_eq!(render_container_outline(&c), expected);
}

#[test]
fn fields_show_their_modifiers() {
    let mut c = Container::new("Limits", ContainerKind::Struct, Location::default());
    c.push(
        Declaration::new(
            "Max",
            DeclKind::Field {
                type_name: "int".into(),
                is_const: true,
                is_readonly: false,
            },
        ),
        Decoration::default(),
    );
    c.push(
        Declaration::new(
            "Shared",
            DeclKind::Field {
                type_name: "int".into(),
                is_const: false,
                is_readonly: true,
            },
        )
        .with_static(true),
        Decoration::default(),
    );

    let outline = render_container_outline(&c);
    assert!(outline.starts_with("struct Limits\n"));
    assert!(outline.contains("    private const field Max\n"));
    assert!(outline.contains("    private static readonly field Shared\n"));
}

#[test]
fn snapshot_outline_names_the_file() {
    let mut snapshot = Snapshot::new("src/Widget.cs");
    snapshot.containers.push(Container::new(
        "Widget",
        ContainerKind::Class,
        Location::default(),
    ));
    assert_eq!(
        render_outline(&snapshot),
        "// src/Widget.cs\n\nclass Widget\n{\n}\n"
    );
}

#[test]
fn report_lists_diagnostics_with_expected_order() {
    let d = Diagnostic {
        rule_id: "order.overloads_sorted".into(),
        severity: Severity::Warn,
        container: "Widget".into(),
        message: "Overloads are contiguous and sorted: move `Foo()` before `Foo(int)`.".into(),
        location: ReportLocation {
            path: "Widget.cs".into(),
            line: Some(12),
        },
        fixable: true,
        expected_order: vec!["Foo()".into(), "Foo(int)".into()],
        fingerprint: None,
    };
    let md = render_report_md(&report(vec![d], None));

    assert!(md.starts_with("# orderfix report\n"));
    assert!(md.contains("- Status: `warn`"));
    assert!(md.contains("### 1. order.overloads_sorted"));
    assert!(md.contains("- Location: Widget.cs:12"));
    assert!(md.contains("1. `Foo()`\n2. `Foo(int)`\n"));
}

#[test]
fn clean_report_says_so() {
    let md = render_report_md(&report(Vec::new(), None));
    assert!(md.contains("- Status: `pass`"));
    assert!(md.contains("_No diagnostics._"));
    assert!(!md.contains("Files changed"));
}

#[test]
fn changed_files_come_from_report_data() {
    let data = serde_json::json!({
        "files": [
            { "path": "A.json", "sha256_before": "aa", "sha256_after": "bb" },
            { "path": "B.json", "sha256_before": "cc", "sha256_after": "cc" }
        ]
    });
    let md = render_report_md(&report(Vec::new(), Some(data)));
    assert!(md.contains("- `A.json` aa → bb"));
    assert!(!md.contains("B.json"));
}
