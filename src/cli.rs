//! Command-line interface for structscan.

use clap::{ArgAction, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::analyzer::Analyzer;
use crate::config::Config;
use crate::error::FileWarning;
use crate::model::ProjectModel;
use crate::report::{self, Format};
use crate::summary::{Summarizer, Summary};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Commented configuration written by `structscan init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Structural analyzer for Python projects.
///
/// Structscan walks a project, records every top-level class with its
/// methods, signatures, docstrings and variable usage, and derives size,
/// complexity and documentation metrics from that model.
#[derive(Parser)]
#[command(name = "structscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the structural model of a project
    Analyze(AnalyzeArgs),
    /// Summarize a project or one of its files
    Summarize(SummarizeArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Project root to analyze
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover in PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Parse files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Exit with status 1 when any file was skipped
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the summarize command.
#[derive(Parser)]
pub struct SummarizeArgs {
    /// Project root to analyze (ignored with --model)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Summarize a model saved by `analyze --format json`
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Only summarize this root-relative file
    #[arg(long)]
    pub file: Option<String>,

    /// Path to configuration YAML file (default: auto-discover in PATH)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Parse files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Exit with status 1 when any file was skipped
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "structscan.yaml")]
    pub output: PathBuf,
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "structscan=warn",
        1 => "structscan=info",
        _ => "structscan=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let format = Format::parse(&args.format)?;
    let config = Config::load(&args.path, args.config.as_deref())?;

    let analysis = Analyzer::new(&args.path)
        .config(config)
        .parallel(args.parallel)
        .run()?;

    match format {
        Format::Json => report::write_json(&analysis.model, args.output.as_deref())?,
        Format::Pretty => {
            prepare_colors(args.output.as_deref());
            let text = report::render(|out| report::write_model_pretty(out, &analysis.model))?;
            report::emit(&text, args.output.as_deref())?;
        }
    }

    finish(&analysis.warnings, args.strict)
}

/// Run the summarize command.
pub fn run_summarize(args: &SummarizeArgs) -> anyhow::Result<i32> {
    let format = Format::parse(&args.format)?;
    let config = Config::load(&args.path, args.config.as_deref())?;
    let summarizer = Summarizer::new(&config)?;

    let (model, warnings) = match &args.model {
        Some(path) => (ProjectModel::read_json(path)?, Vec::new()),
        None => {
            let analysis = Analyzer::new(&args.path)
                .config(config)
                .parallel(args.parallel)
                .run()?;
            (analysis.model, analysis.warnings)
        }
    };

    let summary = match &args.file {
        Some(file) => {
            let file = file.trim_start_matches("./").replace('\\', "/");
            let summary = summarizer
                .summarize_file(&model, &file)
                .ok_or_else(|| anyhow::anyhow!("file not found in model: {}", file))?;
            Summary::File(summary)
        }
        None => Summary::Project(summarizer.summarize_project(&model)),
    };

    match format {
        Format::Json => report::write_json(&summary, args.output.as_deref())?,
        Format::Pretty => {
            prepare_colors(args.output.as_deref());
            let text = report::render(|out| report::write_summary_pretty(out, &summary))?;
            report::emit(&text, args.output.as_deref())?;
        }
    }

    finish(&warnings, args.strict)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("failed to create directory: {}", e))?;
        }
    }

    std::fs::write(&args.output, DEFAULT_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("failed to write config: {}", e))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: structscan analyze . --format pretty");

    Ok(EXIT_SUCCESS)
}

/// Files get plain text; the terminal keeps colored's own detection.
fn prepare_colors(output: Option<&Path>) {
    if output.is_some() {
        colored::control::set_override(false);
    }
}

fn finish(warnings: &[FileWarning], strict: bool) -> anyhow::Result<i32> {
    report::write_warnings(&mut io::stderr(), warnings)?;
    if strict && !warnings.is_empty() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
