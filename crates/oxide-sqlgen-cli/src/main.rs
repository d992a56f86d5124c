//! sqlgen CLI
//!
//! Renders operation descriptors to SQL for one engine.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use oxide_sqlgen::{
    Dialect, DialectCapabilities, Generated, Generator, OperationDescriptor, TypeRegistry,
    Version,
};

/// Cross-dialect SQL generation.
#[derive(Parser)]
#[command(name = "sqlgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target engine (postgres, mysql, sqlite, mssql, oracle, generic).
    #[arg(short, long, env = "SQLGEN_DIALECT")]
    dialect: Dialect,

    /// Server version as major[.minor[.patch]]; the engine's default if not specified.
    #[arg(short, long, env = "SQLGEN_SERVER_VERSION")]
    server_version: Option<Version>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON descriptor (or a list of them) to SQL.
    Render {
        /// Descriptor file (stdin if not specified).
        input: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the capabilities of the target engine.
    Capabilities,
}

/// One descriptor or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    One(OperationDescriptor),
    Many(Vec<OperationDescriptor>),
}

impl Input {
    fn into_operations(self) -> Vec<OperationDescriptor> {
        match self {
            Self::One(op) => vec![op],
            Self::Many(ops) => ops,
        }
    }
}

#[derive(Serialize)]
struct Rendered {
    operation: &'static str,
    #[serde(flatten)]
    generated: Generated,
}

fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let version = cli
        .server_version
        .unwrap_or_else(|| cli.dialect.default_version());
    let caps = DialectCapabilities::for_dialect(cli.dialect, version);
    debug!(dialect = %cli.dialect, %version, "Loaded capabilities");

    match cli.command {
        Commands::Capabilities => print_json(&caps, true)?,

        Commands::Render { input, pretty } => {
            let raw = read_input(input.as_ref())?;
            let operations = serde_json::from_str::<Input>(&raw)
                .context("parsing operation descriptor")?
                .into_operations();

            let types = TypeRegistry::new();
            let generator = Generator::new(&caps, &types);
            let mut rendered = Vec::with_capacity(operations.len());
            for op in &operations {
                let generated = generator
                    .generate(op)
                    .with_context(|| format!("rendering {}", op.name()))?;
                rendered.push(Rendered {
                    operation: op.name(),
                    generated,
                });
            }
            info!(
                operations = rendered.len(),
                warnings = rendered.iter().map(|r| r.generated.warnings.len()).sum::<usize>(),
                "Rendered"
            );
            print_json(&rendered, pretty)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_dialect_and_version() {
        let cli = Cli::try_parse_from([
            "sqlgen",
            "--dialect",
            "mssql",
            "--server-version",
            "10.50",
            "capabilities",
        ])
        .unwrap();
        assert_eq!(cli.dialect, Dialect::MsSql);
        assert_eq!(cli.server_version, Some(Version::new(10, 50, 0)));
        assert!(matches!(cli.command, Commands::Capabilities));
    }

    #[test]
    fn test_cli_rejects_unknown_dialect() {
        assert!(Cli::try_parse_from(["sqlgen", "--dialect", "db2", "capabilities"]).is_err());
    }

    #[test]
    fn test_input_accepts_one_or_many() {
        let one = r#"{"operation": "delete", "table": {"name": "users"}, "limit": 5}"#;
        let ops = serde_json::from_str::<Input>(one).unwrap().into_operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "delete");

        let many = r#"[
            {"operation": "transaction", "action": "Begin", "transaction": {"id": "t1"}},
            {"operation": "show_indexes", "table": {"name": "users"}}
        ]"#;
        let ops = serde_json::from_str::<Input>(many).unwrap().into_operations();
        assert_eq!(ops.iter().map(|o| o.name()).collect::<Vec<_>>(), ["transaction", "show_indexes"]);
    }

    #[test]
    fn test_rendered_output_is_flat() {
        let caps = DialectCapabilities::latest(Dialect::Sqlite);
        let types = TypeRegistry::new();
        let op: OperationDescriptor =
            serde_json::from_str(r#"{"operation": "delete", "table": {"name": "users"}, "limit": 5}"#)
                .unwrap();
        let generated = Generator::new(&caps, &types).generate(&op).unwrap();
        let json = serde_json::to_value(Rendered {
            operation: op.name(),
            generated,
        })
        .unwrap();
        assert_eq!(json["operation"], "delete");
        assert_eq!(
            json["statements"][0]["sql"],
            "DELETE FROM \"users\" WHERE rowid IN (SELECT rowid FROM \"users\" LIMIT 5)"
        );
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }
}
