use anyhow::Context;
use clap::{Parser, Subcommand};
use fs_err as fs;
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by orderfix.
    PrintSchemas,
    /// Create a snapshot directory with an example snapshot and a default orderfix.toml.
    InitSnapshots {
        #[arg(long, default_value = "snapshots")]
        dir: String,
    },
    /// Bless golden fixtures (overwrite expected outlines).
    BlessFixtures,
}

const EXAMPLE_CONFIG: &str = r#"[policies]
allow = []
deny = []

[overloads]
proximity_threshold = 1

[rewrite]
sole_member_regions = "travel"
max_passes = 8
"#;

fn example_snapshot() -> serde_json::Value {
    serde_json::json!({
        "schema": orderfix_types::schema::ORDERFIX_SNAPSHOT_V1,
        "path": "src/Example.cs",
        "containers": [{
            "name": "Example",
            "line": 1,
            "members": [
                {
                    "name": "Parse",
                    "kind": "method",
                    "params": [{ "name": "text", "type_name": "string" }, { "name": "strict", "type_name": "bool" }],
                    "accessibility": "public",
                    "line": 3,
                    "decor": { "doc_comment": "/// Parses strictly or leniently." }
                },
                {
                    "name": "Parse",
                    "kind": "method",
                    "params": [{ "name": "text", "type_name": "string" }],
                    "accessibility": "public",
                    "line": 6,
                    "decor": { "doc_comment": "/// Parses leniently.", "leading_blank_lines": 1 }
                }
            ]
        }]
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", orderfix_types::schema::ORDERFIX_SNAPSHOT_V1);
            println!("{}", orderfix_types::schema::ORDERFIX_REPORT_V1);
        }
        Command::InitSnapshots { dir } => {
            fs::create_dir_all(&dir).with_context(|| format!("create {dir}"))?;
            let config = format!("{dir}/orderfix.toml");
            if !std::path::Path::new(&config).exists() {
                fs::write(&config, EXAMPLE_CONFIG)?;
            }
            let example = serde_json::to_string_pretty(&example_snapshot())?;
            fs::write(format!("{dir}/Example.json"), example + "\n")?;
            println!("initialized {dir}/{{orderfix.toml,Example.json}}");
        }
        Command::BlessFixtures => {
            let status = ProcessCommand::new("cargo")
                .args(["test", "-p", "orderfix-core", "--test", "golden"])
                .env("ORDERFIX_BLESS", "1")
                .status()
                .context("run golden fixture blessing")?;
            if !status.success() {
                anyhow::bail!("bless-fixtures failed");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_config_parses_as_toml() {
        let value: toml::Value = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(value["rewrite"]["max_passes"].as_integer(), Some(8));
    }

    #[test]
    fn example_snapshot_loads_with_a_violation() {
        let text = example_snapshot().to_string();
        let snapshot = orderfix_snapshots::parse_snapshot(
            orderfix_snapshots::SnapshotFormat::Json,
            &text,
        )
        .unwrap();
        assert_eq!(
            snapshot.containers[0].signatures(),
            vec!["Parse(string, bool)", "Parse(string)"]
        );
    }
}
