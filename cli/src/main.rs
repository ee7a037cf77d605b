//! thesischeck CLI - conformance checks for dissertation PDFs

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use thesischeck::rules::Applicability;
use thesischeck::{
    parse_file_with_options, ControlTree, ErrorMode, ExtractMode, JsonFormat, Outcome,
    ParseOptions, Report, RuleId, RuleRegistry, Session, SessionOptions, Target,
};

/// Exit code when every rule passed or was skipped.
const EXIT_PASSED: i32 = 0;
/// Exit code when at least one rule failed.
const EXIT_FAILED: i32 = 1;
/// Exit code when inputs could not be loaded.
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "thesischeck")]
#[command(version)]
#[command(about = "Check a dissertation PDF against its template configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the checks and report the result of every rule
    Check {
        /// PDF to check
        #[arg(long, value_name = "FILE", env = "THESISCHECK_PDF")]
        pdf: PathBuf,

        /// Build log with control directives
        #[arg(long, value_name = "FILE", env = "THESISCHECK_LOG")]
        log: Option<PathBuf>,

        /// YAML configuration keyed by document type
        #[arg(long, value_name = "FILE", env = "THESISCHECK_CONFIG")]
        config: PathBuf,

        /// Document type (dissertation, synopsis, presentation, ...)
        #[arg(long = "type", value_name = "NAME", env = "THESISCHECK_TYPE")]
        document_type: String,

        /// Draft build: skip checks that only apply to the final document
        #[arg(long)]
        draft: bool,

        /// Keep pages whose text cannot be extracted instead of failing
        #[arg(long)]
        lenient: bool,

        /// Run only these rules (repeatable)
        #[arg(long = "rule", value_name = "ID")]
        rules: Vec<RuleId>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Compact JSON output
        #[arg(long, requires = "json")]
        compact: bool,
    },

    /// List rules and whether they apply to a document type
    Rules {
        /// Document type
        #[arg(long = "type", value_name = "NAME")]
        document_type: Option<String>,

        /// Draft build
        #[arg(long)]
        draft: bool,
    },

    /// Dump the control directives of a build log as JSON
    Control {
        /// Build log
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Skip text extraction; read page sizes, outline and metadata only
        #[arg(long)]
        outline_only: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            pdf,
            log,
            config,
            document_type,
            draft,
            lenient,
            rules,
            json,
            compact,
        } => {
            let error_mode = if lenient {
                ErrorMode::Lenient
            } else {
                ErrorMode::Strict
            };
            let mut options = SessionOptions::new(pdf, config, document_type)
                .with_draft(draft)
                .with_parse_options(ParseOptions::new().with_error_mode(error_mode));
            if let Some(log) = log {
                options = options.with_log(log);
            }
            let format = json.then_some(if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            });
            cmd_check(options, &rules, format)
        }
        Commands::Rules {
            document_type,
            draft,
        } => {
            cmd_rules(document_type.as_deref(), draft);
            Ok(EXIT_PASSED)
        }
        Commands::Control { input } => cmd_control(&input).map(|()| EXIT_PASSED),
        Commands::Info {
            input,
            outline_only,
        } => {
            let mode = if outline_only {
                ExtractMode::StructureOnly
            } else {
                ExtractMode::Full
            };
            cmd_info(&input, mode).map(|()| EXIT_PASSED)
        }
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            process::exit(EXIT_ERROR);
        }
    }
}

fn cmd_check(
    options: SessionOptions,
    rules: &[RuleId],
    format: Option<JsonFormat>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Loading {}...", options.pdf.display()));

    let session = Session::open(options);
    pb.finish_and_clear();
    let session = session?;

    if !rules.is_empty() {
        log::debug!("Selected rules: {:?}", rules);
    }
    let report = session.run(&RuleRegistry::with_defaults(), rules)?;

    match format {
        Some(format) => println!("{}", report.to_json(format)?),
        None => print_report(&report),
    }

    Ok(if report.is_success() {
        EXIT_PASSED
    } else {
        EXIT_FAILED
    })
}

fn print_report(report: &Report) {
    let draft = if report.target.draft { ", draft" } else { "" };
    println!(
        "{} {} ({} pages{})",
        "Checking".cyan().bold(),
        report.document_type,
        report.page_count,
        draft
    );
    println!("{}", "─".repeat(40).dimmed());

    for result in &report.results {
        match &result.outcome {
            Outcome::Passed => println!("{} {}", "PASS".green().bold(), result.rule),
            Outcome::Failed { message } => {
                println!("{} {}: {}", "FAIL".red().bold(), result.rule, message)
            }
            Outcome::Skipped { reason } => println!(
                "{} {} {}",
                "SKIP".yellow(),
                result.rule,
                format!("({})", reason).dimmed()
            ),
        }
    }

    println!("{}", "─".repeat(40).dimmed());
    let summary = format!(
        "{} passed, {} failed, {} skipped",
        report.passed_count(),
        report.failed_count(),
        report.skipped_count()
    );
    if report.is_success() {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.red().bold());
    }
}

fn cmd_rules(document_type: Option<&str>, draft: bool) {
    let registry = RuleRegistry::with_defaults();
    let applicability = document_type.map(|t| Applicability::for_target(Target::new(t, draft)));

    println!("{}", "Rules".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for rule in registry.iter() {
        let id = rule.id();
        let status = match applicability.as_ref().map(|a| a.excluded_by(id)) {
            None => String::new(),
            Some(None) => format!(" {}", "applies".green()),
            Some(Some(gate)) => format!(" {}", format!("skipped: {}", gate).yellow()),
        };
        println!(
            "{:<16}{}{}",
            id.to_string().bold(),
            rule.description().dimmed(),
            status
        );
    }
}

fn cmd_control(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let tree = ControlTree::from_path(input)?;
    println!("{}", tree.to_json(JsonFormat::Pretty)?);
    Ok(())
}

fn cmd_info(input: &Path, mode: ExtractMode) -> Result<(), Box<dyn std::error::Error>> {
    // Outline and metadata remain readable when text extraction fails
    let options = ParseOptions::new().lenient().with_extract_mode(mode);
    let doc = parse_file_with_options(input, options)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.page_count());
    if let Some(first) = doc.pages.first() {
        println!(
            "{}: {} x {} mm",
            "Paper".bold(),
            first.width_mm(),
            first.height_mm()
        );
    }

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = doc.metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    let annotations: usize = doc.pages.iter().map(|p| p.annotations.len()).sum();
    let links: usize = doc.pages.iter().map(|p| p.links.len()).sum();
    println!("{}: {}", "Links".bold(), links);
    println!("{}: {}", "Annotations".bold(), annotations);

    println!();
    println!("{}", "Table of Contents".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for entry in &doc.toc().entries {
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        let page = entry
            .page
            .map_or_else(|| "-".to_string(), |p| p.to_string());
        println!("{}{} {}", indent, entry.title, page.dimmed());
    }

    Ok(())
}
