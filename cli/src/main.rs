mod actions;

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use command_dispatch::{CommandManifest, Controller, Invoker};
use command_dispatch_core::UsageMode;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Manifest used when `--manifest` is not given.
const DEFAULT_MANIFEST: &str = r#"
version: "1.0"
commands:
  - name: echo
    description: Print the arguments back
    spec: "g"
    tags: [text]
    action: echo
  - name: sum
    description: Add up to eight numbers
    spec: "f|f|f|f|f|f|f|f"
    min_args: 1
    action: sum
  - name: exec
    description: Dispatch a nested command line
    spec: "g"
    tags: [line]
    min_args: 1
    action: exec
  - name: fail
    description: Fail with the given reason
    spec: "g"
    tags: [reason]
    action: fail
  - name: abort
    description: Abort without running anything
    action: abort
"#;

#[derive(Debug, Parser)]
#[command(name = "cmd-dispatch")]
#[command(about = "Run and inspect typed command definitions")]
struct Cli {
    /// Command manifest (YAML, or JSON by extension). Defaults to the built-in
    /// demo commands.
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,
    /// Log dispatch steps to stderr (same as RUST_LOG=debug).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dispatch command lines from --exec or, if none are given, from stdin.
    Run(RunArgs),
    /// Print the usage signature of each command.
    Usage(UsageArgs),
    /// Validate a manifest without running anything.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Command line to dispatch; may be repeated.
    #[arg(short = 'e', long = "exec")]
    lines: Vec<String>,
    /// Invoker name (overrides the manifest).
    #[arg(long = "as")]
    invoker: Option<String>,
    /// Invoker authorization level (overrides the manifest).
    #[arg(long)]
    level: Option<u32>,
    /// Stop at the first failing line.
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Debug, Args)]
struct UsageArgs {
    /// Commands to describe (default: all).
    names: Vec<String>,
    /// Render every argument slot, including trailing unrestricted ones.
    #[arg(long)]
    full: bool,
    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Manifest to check (defaults to --manifest).
    path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct UsageEntry {
    name: String,
    usage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run_lines(cli.manifest.as_deref(), args),
        Command::Usage(args) => run_usage(cli.manifest.as_deref(), args),
        Command::Check(args) => run_check(args.path.as_deref().or(cli.manifest.as_deref())),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_manifest(path: Option<&Path>) -> anyhow::Result<CommandManifest> {
    let manifest = match path {
        Some(path) => CommandManifest::load(path)
            .with_context(|| format!("failed to load manifest '{}'", path.display()))?,
        None => CommandManifest::from_yaml_str(DEFAULT_MANIFEST)?,
    };
    manifest.validate()?;
    Ok(manifest)
}

fn build_controller(manifest: &CommandManifest) -> anyhow::Result<Controller> {
    let controller = Controller::new();
    for command in &manifest.commands {
        let builder = actions::bind(command.to_builder(), command.action.as_deref())?;
        controller.register(builder)?;
    }
    info!(commands = controller.len(), "registered manifest commands");
    Ok(controller)
}

/// Returns `Ok(false)` when at least one line failed.
fn run_lines(manifest: Option<&Path>, args: RunArgs) -> anyhow::Result<bool> {
    let manifest = load_manifest(manifest)?;
    let controller = build_controller(&manifest)?;

    let mut invoker = manifest.invoker.clone();
    if let Some(name) = args.invoker {
        invoker.name = name;
    }
    if let Some(level) = args.level {
        invoker.auth_level = level;
    }

    let lines = if args.lines.is_empty() {
        read_script(std::io::stdin().lock())?
    } else {
        args.lines
    };

    let mut all_ok = true;
    for line in &lines {
        if !dispatch_line(&controller, &invoker, line) {
            all_ok = false;
            if args.fail_fast {
                break;
            }
        }
    }
    Ok(all_ok)
}

/// Reads non-blank, non-comment lines.
fn read_script(reader: impl BufRead) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read stdin")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push(line);
    }
    Ok(lines)
}

fn dispatch_line(controller: &Controller, invoker: &Invoker, line: &str) -> bool {
    match controller.dispatch(invoker, line) {
        Ok(code) => {
            debug!(line, code, "line completed");
            true
        }
        Err(err) => {
            eprintln!("error[{}]: {err}", err.kind());
            false
        }
    }
}

fn run_usage(manifest: Option<&Path>, args: UsageArgs) -> anyhow::Result<bool> {
    let manifest = load_manifest(manifest)?;
    let controller = build_controller(&manifest)?;
    let mode = if args.full {
        UsageMode::Full
    } else {
        UsageMode::Compact
    };

    let names = if args.names.is_empty() {
        controller.commands()
    } else {
        args.names
    };

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let usage = controller
            .usage(&name, mode)
            .with_context(|| format!("unknown command '{name}'"))?;
        let description = manifest.get(&name).and_then(|c| c.description.clone());
        entries.push(UsageEntry {
            name,
            usage,
            description,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            match &entry.description {
                Some(description) => println!("{}\n    {description}", entry.usage),
                None => println!("{}", entry.usage),
            }
        }
    }
    Ok(true)
}

fn run_check(path: Option<&Path>) -> anyhow::Result<bool> {
    let manifest = load_manifest(path)?;
    build_controller(&manifest)?;
    println!(
        "Manifest version {} is valid: {} command(s).",
        manifest.version,
        manifest.commands.len()
    );
    Ok(true)
}
