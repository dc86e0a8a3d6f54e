//! provider-doc-lint CLI
//!
//! Command-line interface for checking provider resource documentation
//! against resource schemas and fixing the drift.
//!
//! Exit codes:
//! - 0: documentation matches the schemas (or everything was fixed)
//! - 1: issues remain, or a run could not start

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use provider_doc_lint_checker::{
    render_json, render_report, LintRun, Linter, ReportOptions, DOCUMENT_EXTENSIONS,
};
use provider_doc_lint_common::LintConfig;
use provider_doc_lint_fixer::DocumentFixer;
use provider_doc_lint_parser::parse_document;
use provider_doc_lint_schema::DescriptionSource;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "provider-doc-lint")]
#[command(version, about = "Cross-check provider resource documentation against resource schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check documents against their schemas and report every discrepancy
    #[command(after_help = "EXAMPLES:\n  \
        # Check the whole corpus\n  \
        provider-doc-lint check --docs website/docs/r --schemas schemas\n\n  \
        # Check two resources with a configuration file\n  \
        provider-doc-lint check \\\n    \
        --docs website/docs/r \\\n    \
        --schemas schemas \\\n    \
        --config doc-lint.yaml \\\n    \
        --resource azurerm_redis_cache,azurerm_key_vault\n\n  \
        # Machine-readable output\n  \
        provider-doc-lint check --docs website/docs/r --schemas schemas --format json")]
    Check(LintArgs),

    /// Check, then rewrite documents to fix what can be fixed mechanically
    #[command(after_help = "EXAMPLES:\n  \
        # Fix the whole corpus in place\n  \
        provider-doc-lint fix --docs website/docs/r --schemas schemas\n\n  \
        # Fix one resource, ignoring its tags\n  \
        provider-doc-lint fix \\\n    \
        --docs website/docs/r \\\n    \
        --schemas schemas \\\n    \
        --resource azurerm_redis_cache \\\n    \
        --exclude all.tags")]
    Fix(LintArgs),

    /// Parse one document and print the extracted model as JSON
    #[command(after_help = "EXAMPLES:\n  \
        # Resource type derived from the file name\n  \
        provider-doc-lint inspect --doc website/docs/r/redis_cache.html.markdown\n\n  \
        # Explicit resource type\n  \
        provider-doc-lint inspect --doc page.md --resource azurerm_redis_cache")]
    Inspect {
        /// Path to the document
        #[arg(short, long)]
        doc: PathBuf,

        /// Resource type the document describes
        #[arg(short, long)]
        resource: Option<String>,

        /// Provider prefix used when deriving the resource type from the file name
        #[arg(long, default_value = "azurerm")]
        provider: String,
    },
}

#[derive(Args)]
struct LintArgs {
    /// Directory containing the resource documents
    #[arg(short, long)]
    docs: PathBuf,

    /// Directory containing the resource schema descriptions (YAML or JSON)
    #[arg(short, long)]
    schemas: PathBuf,

    /// Lint configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated list of resource types to check
    #[arg(short, long, value_delimiter = ',')]
    resource: Vec<String>,

    /// Comma-separated list of resources or field keys to leave out
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Upgrade guide listing pending property changes
    #[arg(long)]
    upgrade_guide: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Number of worker threads (defaults to the available parallelism)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Report grouped by resource
    Text,
    /// The whole run as JSON
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let success = match cli.command {
        Commands::Check(args) => check_command(&args, cli.verbose)?,
        Commands::Fix(args) => fix_command(&args, cli.verbose)?,
        Commands::Inspect {
            doc,
            resource,
            provider,
        } => {
            inspect_command(&doc, resource.as_deref(), &provider)?;
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Ignore a second initialization
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Configuration file merged with the command-line filters
fn load_config(args: &LintArgs) -> Result<LintConfig> {
    let mut config = match &args.config {
        Some(path) => LintConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LintConfig::default(),
    };

    config.include.extend(args.resource.iter().cloned());
    config.exclude.extend(args.exclude.iter().cloned());
    if let Some(guide) = &args.upgrade_guide {
        config.upgrade_guide = Some(guide.clone());
    }

    Ok(config)
}

fn build_linter(args: &LintArgs) -> Result<(Linter, DescriptionSource)> {
    let config = load_config(args)?;
    let source = DescriptionSource::load(&args.schemas)
        .with_context(|| format!("Failed to load schemas from {}", args.schemas.display()))?;

    let mut linter = Linter::new(config);
    if let Some(jobs) = args.jobs {
        linter = linter.workers(jobs);
    }
    Ok((linter, source))
}

fn check_command(args: &LintArgs, verbose: bool) -> Result<bool> {
    let (linter, source) = build_linter(args)?;
    if args.format == OutputFormat::Text {
        eprintln!(
            "{} Checking {} against {} schema(s)",
            "→".cyan(),
            args.docs.display(),
            source.len()
        );
    }

    let run = linter.run(&source, &args.docs);
    print_run(&run, args.format, verbose)?;

    if args.format == OutputFormat::Text {
        if run.has_failures() {
            eprintln!(
                "\n{} {} issue(s) and {} error(s) found",
                "⚠".yellow(),
                run.failure_count(),
                run.error_count()
            );
        } else {
            eprintln!("\n{}", "✓ Documentation matches the schemas".green().bold());
        }
    }

    Ok(!run.has_failures())
}

fn fix_command(args: &LintArgs, verbose: bool) -> Result<bool> {
    let (linter, source) = build_linter(args)?;
    let fixer = DocumentFixer::new().context("Failed to load fix templates")?;
    if args.format == OutputFormat::Text {
        eprintln!(
            "{} Fixing {} against {} schema(s)",
            "→".cyan(),
            args.docs.display(),
            source.len()
        );
    }

    let run = linter.fix(&source, &args.docs, &fixer);
    print_run(&run, args.format, verbose)?;

    let remaining = remaining_count(&run);
    if args.format == OutputFormat::Text {
        eprintln!(
            "\n{} Applied {} fix(es)",
            "✓".green(),
            run.applied_count()
        );
        if remaining > 0 {
            eprintln!(
                "{} {} issue(s) need a manual fix",
                "⚠".yellow(),
                remaining
            );
        }
        if run.error_count() > 0 {
            eprintln!("{} {} resource(s) failed", "⚠".yellow(), run.error_count());
        }
    }

    Ok(remaining == 0 && run.error_count() == 0)
}

/// Issues a fix run could not resolve
///
/// Resources without a fix summary (no document) keep all their failing
/// diagnostics.
fn remaining_count(run: &LintRun) -> usize {
    run.reports
        .iter()
        .map(|report| match report.fix {
            Some(fix) => fix.unfixable,
            None => report.failing().count(),
        })
        .sum()
}

fn print_run(run: &LintRun, format: OutputFormat, verbose: bool) -> Result<()> {
    let output = match format {
        OutputFormat::Text => render_report(run, &ReportOptions { verbose })?,
        OutputFormat::Json => render_json(run)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}

fn inspect_command(doc_path: &Path, resource: Option<&str>, provider: &str) -> Result<()> {
    let text = fs::read_to_string(doc_path)
        .with_context(|| format!("Failed to read {}", doc_path.display()))?;

    let resource_type = match resource {
        Some(resource) => resource.to_string(),
        None => resource_from_path(doc_path, provider).with_context(|| {
            format!(
                "Cannot derive a resource type from {}; pass --resource",
                doc_path.display()
            )
        })?,
    };

    let doc = parse_document(&resource_type, &text);
    println!(
        "{}",
        serde_json::to_string_pretty(&doc).context("Failed to serialize document model")?
    );
    Ok(())
}

/// `redis_cache.html.markdown` -> `azurerm_redis_cache`
fn resource_from_path(path: &Path, provider: &str) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    DOCUMENT_EXTENSIONS
        .iter()
        .find_map(|ext| file_name.strip_suffix(&format!(".{ext}")))
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{provider}_{stem}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lint_args_merge_into_config() {
        let cli = Cli::try_parse_from([
            "provider-doc-lint",
            "check",
            "--docs",
            "docs",
            "--schemas",
            "schemas",
            "--resource",
            "azurerm_a,azurerm_b",
            "--exclude",
            "all.tags",
            "--upgrade-guide",
            "guide.md",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);

        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.include, vec!["azurerm_a", "azurerm_b"]);
        assert_eq!(config.exclude, vec!["all.tags"]);
        assert_eq!(config.upgrade_guide, Some(PathBuf::from("guide.md")));
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_resource_from_path() {
        assert_eq!(
            resource_from_path(Path::new("docs/r/redis_cache.html.markdown"), "azurerm"),
            Some("azurerm_redis_cache".to_string())
        );
        assert_eq!(
            resource_from_path(Path::new("key_vault.md"), "azurerm"),
            Some("azurerm_key_vault".to_string())
        );
        assert_eq!(resource_from_path(Path::new("notes.txt"), "azurerm"), None);
    }

    #[test]
    fn test_remaining_count() {
        use provider_doc_lint_checker::{Diagnostic, DiagnosticKind, FixSummary, ResourceReport};

        let run = LintRun {
            reports: vec![
                ResourceReport {
                    resource_type: "azurerm_a".into(),
                    path: None,
                    diagnostics: vec![Diagnostic::new(
                        "azurerm_a",
                        DiagnosticKind::NoDocument,
                        "",
                        None,
                    )],
                    error: None,
                    fix: None,
                },
                ResourceReport {
                    resource_type: "azurerm_b".into(),
                    path: Some(PathBuf::from("b.html.markdown")),
                    diagnostics: vec![],
                    error: None,
                    fix: Some(FixSummary {
                        applied: 3,
                        unfixable: 2,
                    }),
                },
            ],
        };
        assert_eq!(remaining_count(&run), 3);
    }
}
