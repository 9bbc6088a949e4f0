//! Built-in Context CLI
//!
//! Read, update and delete properties of a built-in context document stored
//! as a JSON file, enforcing the configured schema.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use builtin_context::{
    BuiltinContext, Conformance, ConformanceChecker, ContextConfig, ContextError, MutationMode,
    PathResult, SchemaGate,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "context-path")]
#[command(about = "Read and update a built-in context document by dot path")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Schema file (overrides the configured one)
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Apply changes without consulting the schema
    #[arg(long, global = true)]
    permissive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a path
    Get {
        /// Document file (JSON)
        document: PathBuf,
        /// Dot path, e.g. profile.address.city
        path: String,
    },

    /// Set the value at a path
    Set {
        document: PathBuf,
        path: String,
        /// JSON value; anything that does not parse is stored as a string
        value: String,
        /// Do not write the document back
        #[arg(long)]
        dry_run: bool,
        /// Print a line diff of the document
        #[arg(long)]
        diff: bool,
    },

    /// Delete the property at a path
    Delete {
        document: PathBuf,
        path: String,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        diff: bool,
    },

    /// Check a whole document against the schema
    Validate { document: PathBuf },

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        #[arg(short, long, default_value = "context.toml")]
        output: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = run(cli);
    if let Err(e) = &outcome {
        eprintln!("Error: {:#}", e);
    }
    std::process::exit(exit_code(&outcome));
}

/// 0 on success, 1 when the operation was refused, 2 on any other error
fn exit_code(outcome: &Result<bool>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(_) => 2,
    }
}

/// Returns whether the requested operation succeeded
fn run(cli: Cli) -> Result<bool> {
    let mut config = ContextConfig::load_from(cli.config.as_deref())?;
    if let Some(schema) = cli.schema {
        config.schema.path = Some(schema);
    }
    if cli.permissive {
        config.mutation.mode = MutationMode::Permissive;
    }

    match cli.command {
        Commands::Get { document, path } => {
            let engine = engine(&config, false)?;
            let doc = read_document(&document)?;
            Ok(report(&engine.get(&doc, &path)))
        }

        Commands::Set {
            document,
            path,
            value,
            dry_run,
            diff,
        } => {
            let engine = engine(&config, config.mutation.mode == MutationMode::Strict)?;
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            mutate(&document, dry_run, diff, |doc| engine.set(doc, &path, value))
        }

        Commands::Delete {
            document,
            path,
            dry_run,
            diff,
        } => {
            let engine = engine(&config, config.mutation.mode == MutationMode::Strict)?;
            mutate(&document, dry_run, diff, |doc| engine.delete(doc, &path))
        }

        Commands::Validate { document } => {
            let engine = engine(&config, true)?;
            let doc = read_document(&document)?;
            let verdict = engine.validate(&doc);
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            Ok(verdict.valid)
        }

        Commands::Config { action } => {
            match action {
                ConfigAction::Show { json } => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&config)?);
                    } else {
                        println!("{}", toml::to_string_pretty(&config)?);
                    }
                }
                ConfigAction::Init { output } => {
                    ContextConfig::default().save(&output)?;
                    println!("✅ Created config file: {}", output);
                }
            }
            Ok(true)
        }
    }
}

/// Checker used by the CLI: reads and permissive writes never need a schema
enum Gate {
    Schema(SchemaGate),
    Unchecked,
}

impl ConformanceChecker for Gate {
    fn check(&self, document: &Value) -> Conformance {
        match self {
            Gate::Schema(gate) => gate.check(document),
            Gate::Unchecked => Conformance::conformant(),
        }
    }
}

/// Build the engine, loading the schema only when `needs_schema` is set
fn engine(config: &ContextConfig, needs_schema: bool) -> Result<BuiltinContext<Gate>> {
    let gate = if needs_schema {
        let schema_path = config
            .schema_path()
            .ok_or(ContextError::MissingSchema)
            .context("could not load the built-in context schema")?;
        let gate = SchemaGate::from_file(&schema_path)
            .context("could not load the built-in context schema")?;
        Gate::Schema(gate)
    } else {
        Gate::Unchecked
    };

    Ok(BuiltinContext::new(gate)
        .with_mode(config.mutation.mode)
        .with_leaf_value_field(config.mutation.leaf_value_field.clone()))
}

fn read_document(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Run one set/delete and write the document back if it committed
fn mutate<F>(path: &Path, dry_run: bool, diff: bool, op: F) -> Result<bool>
where
    F: for<'a> FnOnce(&'a mut Value) -> PathResult<'a>,
{
    let mut doc = read_document(path)?;
    let before = serde_json::to_string_pretty(&doc)?;

    let valid = report(&op(&mut doc));
    let after = serde_json::to_string_pretty(&doc)?;

    if diff {
        print_diff(&before, &after);
    }

    if valid && !dry_run && before != after {
        fs::write(path, after + "\n").with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(valid)
}

fn report(result: &PathResult<'_>) -> bool {
    println!(
        "{}",
        serde_json::to_string_pretty(result).unwrap_or_else(|_| result.message.to_string())
    );
    result.valid
}

fn print_diff(before: &str, after: &str) {
    let diff = TextDiff::from_lines(before, after);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        print!("{}{}", sign, change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "a": { "type": "object", "properties": { "b": { "type": "number" } } }
        }
    }"#;

    const DOCUMENT: &str = "{\"a\": {\"b\": 1}}";

    struct Workspace {
        _dir: tempfile::TempDir,
        schema: PathBuf,
        document: PathBuf,
    }

    fn workspace() -> Workspace {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.json");
        let document = dir.path().join("context.json");
        fs::write(&schema, SCHEMA).unwrap();
        fs::write(&document, DOCUMENT).unwrap();
        Workspace {
            _dir: dir,
            schema,
            document,
        }
    }

    fn run_args(args: &[&str]) -> Result<bool> {
        let cli = Cli::try_parse_from(std::iter::once("context-path").chain(args.iter().copied()))
            .unwrap();
        run(cli)
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_committed_set_writes_document() {
        let ws = workspace();
        let outcome = run_args(&[
            "--schema",
            ws.schema.to_str().unwrap(),
            "set",
            ws.document.to_str().unwrap(),
            "a.b",
            "2",
        ]);
        assert!(outcome.unwrap());
        assert_eq!(read(&ws.document), serde_json::json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_rejected_set_leaves_file_untouched() {
        let ws = workspace();
        let outcome = run_args(&[
            "--schema",
            ws.schema.to_str().unwrap(),
            "set",
            ws.document.to_str().unwrap(),
            "a.b",
            "\"x\"",
        ]);
        assert_eq!(exit_code(&outcome), 1);
        assert_eq!(fs::read_to_string(&ws.document).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_dry_run_never_writes() {
        let ws = workspace();
        let outcome = run_args(&[
            "--schema",
            ws.schema.to_str().unwrap(),
            "delete",
            ws.document.to_str().unwrap(),
            "a.b",
            "--dry-run",
            "--diff",
        ]);
        assert_eq!(exit_code(&outcome), 0);
        assert_eq!(fs::read_to_string(&ws.document).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_missing_leaf_exits_with_refusal() {
        let ws = workspace();
        let outcome = run_args(&[
            "--schema",
            ws.schema.to_str().unwrap(),
            "delete",
            ws.document.to_str().unwrap(),
            "a.c",
        ]);
        assert_eq!(exit_code(&outcome), 1);
        assert_eq!(fs::read_to_string(&ws.document).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_get_runs_without_schema() {
        let ws = workspace();
        let outcome = run_args(&["get", ws.document.to_str().unwrap(), "a.b"]);
        assert_eq!(exit_code(&outcome), 0);

        let outcome = run_args(&["get", ws.document.to_str().unwrap(), "a.c"]);
        assert_eq!(exit_code(&outcome), 1);
    }

    #[test]
    fn test_permissive_set_runs_without_schema() {
        let ws = workspace();
        let outcome = run_args(&[
            "--permissive",
            "set",
            ws.document.to_str().unwrap(),
            "a.b",
            "\"x\"",
        ]);
        assert_eq!(exit_code(&outcome), 0);
        assert_eq!(read(&ws.document), serde_json::json!({"a": {"b": "x"}}));
    }

    #[test]
    fn test_strict_set_and_validate_require_schema() {
        let ws = workspace();
        let outcome = run_args(&["set", ws.document.to_str().unwrap(), "a.b", "2"]);
        assert_eq!(exit_code(&outcome), 2);

        let outcome = run_args(&["validate", ws.document.to_str().unwrap()]);
        assert_eq!(exit_code(&outcome), 2);
        assert_eq!(fs::read_to_string(&ws.document).unwrap(), DOCUMENT);
    }

    #[test]
    fn test_validate_with_schema() {
        let ws = workspace();
        let outcome = run_args(&[
            "--schema",
            ws.schema.to_str().unwrap(),
            "validate",
            ws.document.to_str().unwrap(),
        ]);
        assert_eq!(exit_code(&outcome), 0);
    }
}
