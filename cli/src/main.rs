use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use argbind_core::{ArgError, BoundValue, Scope, ScopeSpec, validate_spec};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `argbind_core=debug`).
const LOG_ENV: &str = "ARGBIND_LOG";

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argbind")]
#[command(about = "Bind command-line tokens against declarative option definitions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse the tokens after `--` against a declaration file.
    Parse(ParseArgs),
    /// Print the help screen a declaration file produces.
    Usage(SpecArgs),
    /// Validate a declaration file without parsing anything.
    Check(SpecArgs),
}

#[derive(Debug, Args)]
struct SpecArgs {
    /// Declaration file (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Declaration file (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    spec: PathBuf,
    /// Report unclaimed tokens instead of rejecting them.
    #[arg(long)]
    allow_unknown: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ParseOutput {
    program: String,
    values: BTreeMap<String, BoundValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    remaining: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Usage(args) => run_usage(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_scope(path: &Path) -> Result<Scope, String> {
    let spec = ScopeSpec::load(path)
        .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
    spec.build()
        .map_err(|err| format!("Failed to build '{}': {err}", path.display()))
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let mut scope = load_scope(&args.spec)?;
    debug!(program = scope.program(), tokens = args.tokens.len(), "Parsing tokens");

    let outcome = if args.allow_unknown {
        scope.parse_known(args.tokens)
    } else {
        scope.parse(args.tokens).map(|()| Vec::new())
    };
    let remaining = match outcome {
        Ok(remaining) => remaining,
        Err(ArgError::HelpRequested { usage }) => {
            print!("{usage}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };

    let output = ParseOutput {
        program: scope.program().to_string(),
        values: scope.values(),
        remaining,
    };
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&output).map_err(|e| e.to_string())?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&output).map_err(|e| e.to_string())?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_usage(args: SpecArgs) -> Result<(), String> {
    let scope = load_scope(&args.spec)?;
    print!("{}", scope.usage());
    Ok(())
}

fn run_check(args: SpecArgs) -> Result<(), String> {
    let spec = ScopeSpec::load(&args.spec)
        .map_err(|err| format!("Failed to load '{}': {err}", args.spec.display()))?;

    let errors = validate_spec(&spec);
    if !errors.is_empty() {
        let lines: Vec<String> = errors.iter().map(|e| format!("  {e}")).collect();
        return Err(format!(
            "{} is invalid:\n{}",
            args.spec.display(),
            lines.join("\n")
        ));
    }
    spec.build()
        .map_err(|err| format!("{} is invalid: {err}", args.spec.display()))?;

    println!(
        "{}: {} option(s) OK",
        args.spec.display(),
        spec.options.len()
    );
    Ok(())
}
