//! Output formatting for structscan results.
//!
//! Supports two output formats:
//! - JSON: the structural model or a summary, for programmatic consumption
//! - Pretty: colored terminal overview for human readability

use colored::*;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::FileWarning;
use crate::model::ProjectModel;
use crate::summary::{
    AggregateMetrics, ClassSummary, ComplexityDistribution, ComplexityTier, FileSummary,
    ProjectSummary, Summary,
};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Pretty,
}

impl Format {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "json" => Ok(Format::Json),
            "pretty" => Ok(Format::Pretty),
            other => anyhow::bail!("invalid format {:?}, must be 'pretty' or 'json'", other),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize any result as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Print JSON to stdout, or write it to `output`.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    emit(&to_json(value)?, output)
}

/// Print text to stdout, or write it to `output`.
pub fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, text)
                .map_err(|e| anyhow::anyhow!("writing {}: {}", path.display(), e))?;
            tracing::info!("wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

fn write_header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "  {}", "structscan".cyan().bold())?;
    writeln!(out, " v{}  {}", env!("CARGO_PKG_VERSION"), title.dimmed())?;
    writeln!(out)
}

/// Overview of a structural model: stats, files with their classes, imports.
pub fn write_model_pretty(out: &mut impl Write, model: &ProjectModel) -> io::Result<()> {
    write_header(out, "structure")?;

    writeln!(out, "  {}{}", "Project:  ".dimmed(), model.project_name.bold())?;
    writeln!(out, "  {}{}", "Path:     ".dimmed(), model.project_path)?;
    writeln!(
        out,
        "  {}{}",
        "Analyzed: ".dimmed(),
        model.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    let s = &model.stats;
    writeln!(
        out,
        "  {} files  {} lines  {} classes  {} methods",
        s.total_files.to_string().bold(),
        s.total_lines.to_string().bold(),
        s.total_classes.to_string().bold(),
        s.total_methods.to_string().bold()
    )?;
    writeln!(out)?;

    if !model.files.is_empty() {
        writeln!(out, "  {} ({}):", "Files".bold(), model.files.len())?;
        writeln!(out)?;
    }

    for file in &model.files {
        let Some(data) = model.files_data.get(file) else {
            continue;
        };
        writeln!(out, "    {}{}", file.blue(), format!("  ({} lines)", data.lines).dimmed())?;

        for class in model.classes_in_file(file) {
            let plural = if class.methods.len() != 1 { "s" } else { "" };
            writeln!(
                out,
                "      {:<28} {}",
                class.name.green(),
                format!("{} method{}, line {}", class.methods.len(), plural, class.lineno).dimmed()
            )?;
        }

        if !data.functions.is_empty() {
            let names: Vec<&str> = data.functions.iter().map(|f| f.name.as_str()).collect();
            writeln!(out, "      {} {}", "functions:".dimmed(), names.join(", "))?;
        }
    }

    if !model.imports.is_empty() {
        writeln!(out)?;
        let imports: Vec<&str> = model.imports.iter().map(|s| s.as_str()).collect();
        writeln!(out, "  {} ({}):", "Imports".bold(), imports.len())?;
        writeln!(out, "    {}", imports.join(", "))?;
    }

    writeln!(out)
}

/// Pretty form of a file or project summary.
pub fn write_summary_pretty(out: &mut impl Write, summary: &Summary) -> io::Result<()> {
    match summary {
        Summary::Project(p) => write_project_summary(out, p),
        Summary::File(f) => {
            write_header(out, "summary")?;
            write_file_summary(out, f, true)
        }
    }
}

fn write_project_summary(out: &mut impl Write, summary: &ProjectSummary) -> io::Result<()> {
    write_header(out, "summary")?;
    writeln!(out, "  {}{}", "Project: ".dimmed(), summary.project_name.bold())?;
    writeln!(
        out,
        "  {} files  {} classes  {} methods",
        summary.total_files.to_string().bold(),
        summary.total_classes.to_string().bold(),
        summary.total_methods.to_string().bold()
    )?;
    writeln!(out)?;

    write_metrics(out, &summary.metrics, "  ")?;
    writeln!(out)?;

    for file in &summary.files {
        write_file_summary(out, file, false)?;
    }
    Ok(())
}

fn write_file_summary(out: &mut impl Write, file: &FileSummary, detailed: bool) -> io::Result<()> {
    writeln!(
        out,
        "  {}  {}",
        file.file_path.blue(),
        format!("{} classes, {} methods", file.total_classes, file.total_methods).dimmed()
    )?;

    if detailed {
        writeln!(out)?;
        write_metrics(out, &file.metrics, "    ")?;
        writeln!(out)?;
    }

    for class in &file.classes {
        write_class_summary(out, class, detailed)?;
    }
    writeln!(out)
}

fn write_class_summary(out: &mut impl Write, class: &ClassSummary, detailed: bool) -> io::Result<()> {
    let name = if class.is_module_level {
        class.name.dimmed()
    } else {
        class.name.green()
    };
    writeln!(
        out,
        "    {:<28} {} methods  {} code lines  {}% undocumented",
        name, class.method_count, class.code_lines, class.metrics.undocumented_percentage
    )?;

    if !detailed {
        return Ok(());
    }

    for method in &class.methods {
        write!(out, "      ")?;
        write_tier_tag(out, method.complexity)?;
        write!(out, " {:<40}", method.signature)?;
        write!(out, "{}", format!("{:>4} lines", method.code_lines).dimmed())?;
        if !method.signals.is_empty() {
            write!(out, "  {}", format!("signals: {}", method.signals.join(", ")).yellow())?;
        }
        writeln!(out)?;
        writeln!(out, "             {}", method.docstring.dimmed())?;
    }
    Ok(())
}

fn write_metrics(out: &mut impl Write, m: &AggregateMetrics, indent: &str) -> io::Result<()> {
    writeln!(out, "{}{}", indent, "Metrics:".bold())?;
    writeln!(
        out,
        "{}  {:<22} {} total, {} code",
        indent, "Lines", m.total_lines, m.total_code_lines
    )?;
    writeln!(
        out,
        "{}  {:<22} {} avg, {} median",
        indent, "Method length", m.average_method_length, m.median_method_length
    )?;
    writeln!(
        out,
        "{}  {:<22} {} ({}%)",
        indent, "Undocumented", m.undocumented_count, m.undocumented_percentage
    )?;
    write!(out, "{}  {:<22} ", indent, "Complexity")?;
    write_distribution(out, &m.complexity_distribution)?;
    writeln!(out)?;

    if !m.long_methods.is_empty() {
        writeln!(out, "{}  {} ({}):", indent, "Long methods".bold(), m.long_methods_count)?;
        for long in &m.long_methods {
            writeln!(
                out,
                "{}    {:<30} {}",
                indent,
                long.name,
                format!("{} lines ({}-{})", long.lines, long.start, long.end).dimmed()
            )?;
        }
    }
    Ok(())
}

fn write_distribution(out: &mut impl Write, d: &ComplexityDistribution) -> io::Result<()> {
    write!(
        out,
        "{} low  {} medium  {} high  {} critical",
        d.low.to_string().green(),
        d.medium.to_string().yellow(),
        d.high.to_string().yellow().bold(),
        d.critical.to_string().red()
    )
}

fn write_tier_tag(out: &mut impl Write, tier: ComplexityTier) -> io::Result<()> {
    match tier {
        ComplexityTier::Low => write!(out, "{}", "LOW ".green()),
        ComplexityTier::Medium => write!(out, "{}", "MED ".yellow()),
        ComplexityTier::High => write!(out, "{}", "HIGH".yellow().bold()),
        ComplexityTier::Critical => write!(out, "{}", "CRIT".red()),
    }
}

/// Skipped files, one per line.
pub fn write_warnings(out: &mut impl Write, warnings: &[FileWarning]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(out, "{} ({} skipped):", "Warnings".yellow().bold(), warnings.len())?;
    for w in warnings {
        writeln!(
            out,
            "  {} {} {}",
            "WARN ".yellow(),
            w.path.blue(),
            format!("[{}] {}", w.kind, w.message).dimmed()
        )?;
    }
    Ok(())
}

/// Render with a pretty writer into a string.
pub fn render<F>(write: F) -> anyhow::Result<String>
where
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let mut buf = Vec::new();
    write(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}
