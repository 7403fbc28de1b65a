//! Diagnostic CLI for the flag registry.
//!
//! # Responsibility
//! - Exercise `vmbridge_core` against a built-in demo registry.
//! - Apply `VMBRIDGE_*` configuration the same way an embedding host does.
//!
//! The registry is process-local, so `set` only shows the effect within one
//! invocation.

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use std::process::ExitCode;
use vmbridge_core::{core_version, BridgeConfig, FlagKind, FlagRegistry, FlagRegistryError};

#[derive(Debug, Parser)]
#[command(name = "vmbridge", about = "Inspect and change VM flags", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every flag: booleans first, then integers.
    List {
        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print one flag's value.
    Get { kind: KindArg, name: String },
    /// Set one flag and print the value read back.
    Set {
        kind: KindArg,
        name: String,
        value: String,
    },
    /// Print the core version.
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Bool,
    Int,
}

impl From<KindArg> for FlagKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Bool => FlagKind::Bool,
            KindArg::Int => FlagKind::Int,
        }
    }
}

fn demo_registry() -> Result<FlagRegistry, FlagRegistryError> {
    let mut builder = FlagRegistry::builder();
    builder.register_bool("EnableFoo", false)?;
    builder.register_bool("CompilerInlining", true)?;
    builder.register_bool("DebugTraceCalls", false)?;
    builder.register_int("MaxDepth", 10)?;
    builder.register_int("TypeCheckLimit", 2000)?;
    Ok(builder.build())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.init_logging() {
        eprintln!("warning: logging disabled: {err}");
    }

    let registry = match demo_registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    let report = config.apply_flag_overrides(&registry);
    for failure in &report.failures {
        eprintln!("warning: {failure}");
    }
    debug!("event=cli_start module=cli status=ok overrides_applied={}", report.applied);

    match run(cli.command, &registry) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, registry: &FlagRegistry) -> Result<(), String> {
    match command {
        Command::List { json } => {
            println!("{}", render_list(registry, json)?);
            Ok(())
        }
        Command::Get { kind, name } => {
            println!("{}", read(registry, kind.into(), &name)?);
            Ok(())
        }
        Command::Set { kind, name, value } => {
            let written = match FlagKind::from(kind) {
                FlagKind::Bool => {
                    let value = value
                        .parse::<bool>()
                        .map_err(|_| format!("expected true|false, got `{value}`"))?;
                    registry.set_bool(&name, value)
                }
                FlagKind::Int => {
                    let value = value
                        .parse::<i32>()
                        .map_err(|_| format!("expected a 32-bit integer, got `{value}`"))?;
                    registry.set_int(&name, value)
                }
            };
            if !written {
                return Err(not_found(kind.into(), &name));
            }
            println!("{}", read(registry, kind.into(), &name)?);
            Ok(())
        }
        Command::Version => {
            println!("vmbridge {}", core_version());
            Ok(())
        }
    }
}

/// One `kind<TAB>name<TAB>value` line per flag, or the snapshot as JSON.
fn render_list(registry: &FlagRegistry, json: bool) -> Result<String, String> {
    let snapshot = registry.snapshot();
    if json {
        return serde_json::to_string_pretty(&snapshot)
            .map_err(|err| format!("failed to encode snapshot: {err}"));
    }
    let mut lines = Vec::with_capacity(snapshot.len());
    for entry in &snapshot {
        let value = read(registry, entry.kind, &entry.name)?;
        lines.push(format!("{}\t{}\t{}", entry.kind, entry.name, value));
    }
    Ok(lines.join("\n"))
}

fn read(registry: &FlagRegistry, kind: FlagKind, name: &str) -> Result<String, String> {
    let value = match kind {
        FlagKind::Bool => registry.get_bool(name).map(|value| value.to_string()),
        FlagKind::Int => registry.get_int(name).map(|value| value.to_string()),
    };
    value.ok_or_else(|| not_found(kind, name))
}

fn not_found(kind: FlagKind, name: &str) -> String {
    format!("no {kind} flag named `{name}`")
}

#[cfg(test)]
mod tests {
    use super::{demo_registry, read, render_list, run, Command, KindArg};
    use vmbridge_core::FlagKind;

    #[test]
    fn demo_registry_builds() {
        let registry = demo_registry().expect("demo flags are valid");
        assert_eq!(registry.count(FlagKind::Bool), 3);
        assert_eq!(registry.count(FlagKind::Int), 2);
    }

    #[test]
    fn list_json_keeps_bools_before_ints() {
        let registry = demo_registry().expect("demo flags are valid");
        assert_eq!(run(Command::List { json: true }, &registry), Ok(()));

        let json = render_list(&registry, true).expect("snapshot should encode");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let entries = value.as_array().expect("json array");
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0]["name"], "EnableFoo");
        assert_eq!(entries[0]["kind"], "bool");
        assert_eq!(entries[3]["name"], "MaxDepth");
        assert_eq!(entries[3]["kind"], "int");
    }

    #[test]
    fn list_text_shows_current_values() {
        let registry = demo_registry().expect("demo flags are valid");
        registry.set_int("TypeCheckLimit", 7);
        let text = render_list(&registry, false).expect("values are readable");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "bool\tEnableFoo\tfalse");
        assert_eq!(lines[4], "int\tTypeCheckLimit\t7");
    }

    #[test]
    fn set_writes_and_rejects_unknown_or_malformed_input() {
        let registry = demo_registry().expect("demo flags are valid");
        run(
            Command::Set {
                kind: KindArg::Int,
                name: "MaxDepth".to_string(),
                value: "42".to_string(),
            },
            &registry,
        )
        .expect("known flag should be set");
        assert_eq!(
            read(&registry, FlagKind::Int, "MaxDepth"),
            Ok("42".to_string())
        );

        let unknown = run(
            Command::Set {
                kind: KindArg::Bool,
                name: "MaxDepth".to_string(),
                value: "true".to_string(),
            },
            &registry,
        );
        assert_eq!(unknown, Err("no bool flag named `MaxDepth`".to_string()));

        let malformed = run(
            Command::Set {
                kind: KindArg::Int,
                name: "MaxDepth".to_string(),
                value: "deep".to_string(),
            },
            &registry,
        );
        assert!(malformed.is_err());
    }
}
