// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! nnarch: compile node-graph editor exports into network architecture files.
//!
//! ```text
//! nnarch compile <INPUT.json> [-o OUTPUT] [--config FILE] [--reroute-type T]... [--group-type T]... [-q]
//! nnarch inspect <INPUT.json> [--config FILE]
//! nnarch default-config
//! ```
//!
//! The document is rendered in memory before the destination is created, so a
//! failed compile never leaves a partial file behind.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use nnarch_graph::{Architecture, CompileConfig, Compiler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nnarch",
    version,
    about = "Compile node-graph exports into network architecture files",
    disable_help_subcommand = true
)]
struct Cli {
    /// Raise log verbosity on stderr (-v info, -vv debug); `RUST_LOG` overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an export and write the architecture document.
    Compile(CompileArgs),
    /// Compile an export and print the architecture table; nothing is written.
    Inspect(InspectArgs),
    /// Print the default configuration as JSON.
    DefaultConfig,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON config file; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra node type treated as a pass-through reroute (repeatable).
    #[arg(long = "reroute-type", value_name = "TYPE")]
    reroute_types: Vec<String>,

    /// Extra node type treated as a group (repeatable).
    #[arg(long = "group-type", value_name = "TYPE")]
    group_types: Vec<String>,
}

#[derive(Args)]
struct CompileArgs {
    /// Editor export (JSON).
    input: PathBuf,

    /// Destination file (default: the input path with a `.yaml` extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not print the architecture table.
    #[arg(short, long)]
    quiet: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Args)]
struct InspectArgs {
    /// Editor export (JSON).
    input: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    // RUST_LOG, when set, wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Compile(args) => run_compile(args),
        Commands::Inspect(args) => run_inspect(args),
        Commands::DefaultConfig => {
            println!("{}", CompileConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

impl ConfigArgs {
    fn resolve(&self) -> Result<CompileConfig> {
        let mut config = match &self.config {
            Some(path) => CompileConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => CompileConfig::default(),
        };
        for ty in &self.reroute_types {
            config.add_reroute_type(ty.as_str());
        }
        for ty in &self.group_types {
            config.add_group_type(ty.as_str());
        }
        config.validate()?;
        Ok(config)
    }
}

fn run_compile(args: CompileArgs) -> Result<()> {
    let compiler = Compiler::new(args.config.resolve()?);
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("yaml"));
    if same_file(&args.input, &output) {
        bail!(
            "refusing to overwrite the input {}; pass --output",
            args.input.display()
        );
    }

    let architecture = compile_file(&compiler, &args.input)?;
    let document = architecture.to_document(compiler.config());
    fs::write(&output, document)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(output = %output.display(), lines = architecture.len(), "architecture written");

    if !args.quiet {
        println!("{}", render_table(&architecture));
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let compiler = Compiler::new(args.config.resolve()?);
    let architecture = compile_file(&compiler, &args.input)?;
    println!("{}", render_table(&architecture));
    Ok(())
}

/// True when `output` names the existing file `input`, however either path is spelled.
fn same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    // A destination that does not exist yet cannot be the input.
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

fn compile_file(compiler: &Compiler, input: &Path) -> Result<Architecture> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    compiler
        .compile_str(&json)
        .with_context(|| format!("failed to compile {}", input.display()))
}

fn render_table(architecture: &Architecture) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["id", "from", "module", "repeats", "args"]);
    for line in architecture.lines() {
        table.add_row(vec![
            line.id.to_string(),
            line.from.to_string(),
            line.module.clone(),
            line.repeats.to_string(),
            line.args.clone(),
        ]);
    }
    table
}
