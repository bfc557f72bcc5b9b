//! pdfskel CLI - PDF/FDF structure checker

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use pdfskel::{
    analyze_file_with_options, render, Analysis, Diagnostic, FileKind, JsonFormat, ParseOptions,
    Severity,
};

#[derive(Parser)]
#[command(name = "pdfskel")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Check the structure of PDF and FDF files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand that reads a file.
#[derive(Args)]
struct InputArgs {
    /// Input PDF or FDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Treat the input as FDF regardless of extension or header
    #[arg(long, conflicts_with = "pdf")]
    fdf: bool,

    /// Treat the input as PDF regardless of extension or header
    #[arg(long)]
    pdf: bool,

    /// Skip the startxref and entry offset checks
    #[arg(long, env = "PDFSKEL_NO_OFFSET_CHECKS")]
    no_offset_checks: bool,
}

impl InputArgs {
    fn options(&self) -> ParseOptions {
        let mut options = ParseOptions::new().with_offset_checks(!self.no_offset_checks);
        if self.fdf {
            options = options.with_kind(FileKind::Fdf);
        } else if self.pdf {
            options = options.with_kind(FileKind::Pdf);
        }
        options
    }

    fn analyze(&self) -> pdfskel::Result<Analysis> {
        analyze_file_with_options(&self.input, self.options())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print diagnostics (exit status 1 if any error)
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Only print errors and warnings
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print revisions, sections and objects
    Outline {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Write the structure report as JSON
    Json {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print cross-reference entries
    Xref {
        #[command(flatten)]
        input: InputArgs,

        /// Only show entries of this object
        #[arg(long, value_name = "N")]
        object: Option<u64>,

        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// List indirect references and where they resolve
    Refs {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Check { input, quiet }) => cmd_check(&input, quiet),
        Some(Commands::Outline { input }) => cmd_outline(&input),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Xref {
            input,
            object,
            json,
        }) => cmd_xref(&input, object, json),
        Some(Commands::Refs { input }) => cmd_refs(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(true)
        }
        None => {
            println!("{}", "Usage: pdfskel <COMMAND> <FILE>".yellow());
            println!("       pdfskel --help for more information");
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(2);
        }
    }
}

type CmdResult = Result<bool, Box<dyn std::error::Error>>;

fn format_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = match diagnostic.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Information => "info".blue(),
    };
    format!(
        "{} {}: {}",
        diagnostic.range.start.to_string().dimmed(),
        label,
        diagnostic.message
    )
}

fn cmd_check(input: &InputArgs, quiet: bool) -> CmdResult {
    let analysis = input.analyze()?;
    let diagnostics: Vec<Diagnostic> = analysis
        .diagnostics()
        .into_iter()
        .filter(|d| !quiet || d.severity.at_least(Severity::Warning))
        .collect();

    for diagnostic in &diagnostics {
        println!("{}", format_diagnostic(diagnostic));
    }

    let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    let errors = count(Severity::Error);
    let summary = format!(
        "{}: {} error(s), {} warning(s), {} info",
        input.input.display(),
        errors,
        count(Severity::Warning),
        count(Severity::Information)
    );
    if errors > 0 {
        println!("\n{}", summary.red().bold());
    } else {
        println!("\n{}", summary.green().bold());
    }

    Ok(errors == 0)
}

fn cmd_outline(input: &InputArgs) -> CmdResult {
    let analysis = input.analyze()?;
    print!("{}", render::to_text(&analysis.report()));
    Ok(true)
}

fn cmd_json(input: &InputArgs, output: Option<&Path>, compact: bool) -> CmdResult {
    let analysis = input.analyze()?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&analysis.report(), format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(true)
}

fn cmd_xref(input: &InputArgs, object: Option<u64>, json: bool) -> CmdResult {
    let analysis = input.analyze()?;
    let xref = analysis.xref();

    let entries: Vec<_> = match object {
        Some(n) => xref.entries(n),
        None => xref.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(true);
    }

    println!("{}", "Cross-reference entries".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for entry in &entries {
        let flag = if entry.in_use { "n".green() } else { "f".yellow() };
        println!(
            "{:>6} rev {:<3} {:010} {:05} {}  {}",
            entry.object_number,
            entry.revision,
            entry.first,
            entry.generation,
            flag,
            format!("line {}", entry.line + 1).dimmed()
        );
    }

    println!();
    println!("{}: {}", "Tables".bold(), xref.tables().len());
    println!("{}: {}", "Objects".bold(), xref.len());
    println!("{}: {}", "Shown".bold(), entries.len());

    Ok(true)
}

fn cmd_refs(input: &InputArgs) -> CmdResult {
    let analysis = input.analyze()?;
    let mut unresolved = 0;

    for reference in analysis.references() {
        let at = analysis.position(reference.span.start);
        let target = match analysis.definition(&reference) {
            Some(range) => format!("-> {}", range.start).green(),
            None => {
                unresolved += 1;
                "unresolved".red()
            }
        };
        println!(
            "{} {} {} R  {}",
            at.to_string().dimmed(),
            reference.object_number,
            reference.generation,
            target
        );
    }

    if unresolved > 0 {
        println!("\n{} {} unresolved reference(s)", "Note:".yellow(), unresolved);
    }

    Ok(true)
}

fn cmd_version() {
    println!("{} {}", "pdfskel".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF/FDF structure checker");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfskel".dimmed());
    println!("License: MIT");
}
