//! Text and JSON rendering of a lint run

use crate::engine::{LintRun, ResourceReport};
use chrono::Utc;
use provider_doc_lint_common::Result;
use std::fmt::Write as FmtWrite;

/// Report rendering options
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Also list skipped diagnostics, marked as such
    pub verbose: bool,
}

/// Render the run grouped by resource, followed by a summary footer
pub fn render_report(run: &LintRun, options: &ReportOptions) -> Result<String> {
    let mut output = String::new();

    write_header(&mut output, run)?;

    for report in &run.reports {
        write_resource(&mut output, report, options)?;
    }

    write_summary(&mut output, run)?;

    Ok(output)
}

/// Serialize the run as pretty-printed JSON
pub fn render_json(run: &LintRun) -> Result<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

fn write_header(output: &mut String, run: &LintRun) -> Result<()> {
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    writeln!(output, "# Documentation Lint Report")?;
    writeln!(output, "# Generated: {timestamp}")?;
    writeln!(output, "# Resources: {}", run.reports.len())?;
    writeln!(output)?;

    Ok(())
}

fn write_resource(output: &mut String, report: &ResourceReport, options: &ReportOptions) -> Result<()> {
    let shown: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| options.verbose || !d.skip)
        .collect();
    if shown.is_empty() && report.error.is_none() && report.fix.is_none() {
        return Ok(());
    }

    let location = report
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| report.resource_type.clone());

    match &report.path {
        Some(path) => writeln!(output, "{} ({})", report.resource_type, path.display())?,
        None => writeln!(output, "{}", report.resource_type)?,
    }

    if let Some(error) = &report.error {
        writeln!(output, "  error: {error}")?;
    }

    for diagnostic in shown {
        let line = diagnostic
            .line
            .map(|l| format!("{l}:"))
            .unwrap_or_default();
        let marker = if diagnostic.skip { " (skipped)" } else { "" };
        writeln!(
            output,
            "  {location}:{line} [{}] {diagnostic}{marker}",
            diagnostic.kind.name()
        )?;
    }

    if let Some(fix) = &report.fix {
        writeln!(
            output,
            "  fixed {} issue(s), {} left for manual fixing",
            fix.applied, fix.unfixable
        )?;
    }
    writeln!(output)?;

    Ok(())
}

fn write_summary(output: &mut String, run: &LintRun) -> Result<()> {
    let counts = run.counts_by_kind();

    writeln!(output, "Summary:")?;
    if counts.is_empty() {
        writeln!(output, "  no issues found")?;
    }
    for (kind, count) in &counts {
        writeln!(output, "  {kind}: {count}")?;
    }
    writeln!(
        output,
        "Total: {} issue(s), {} skipped, {} error(s) in {} resource(s)",
        run.failure_count(),
        run.skipped_count(),
        run.error_count(),
        run.reports.len()
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, DiagnosticKind};
    use std::path::PathBuf;

    fn sample_run() -> LintRun {
        LintRun {
            reports: vec![
                ResourceReport {
                    resource_type: "azurerm_redis_cache".into(),
                    path: Some(PathBuf::from("docs/redis_cache.html.markdown")),
                    diagnostics: vec![
                        Diagnostic::new(
                            "azurerm_redis_cache",
                            DiagnosticKind::ForceNew { expected: true },
                            "name",
                            Some(31),
                        ),
                        Diagnostic::new(
                            "azurerm_redis_cache",
                            DiagnosticKind::MissingInDoc,
                            "zones",
                            None,
                        )
                        .skipped(true),
                    ],
                    error: None,
                    fix: None,
                },
                ResourceReport {
                    resource_type: "azurerm_clean".into(),
                    path: Some(PathBuf::from("docs/clean.html.markdown")),
                    diagnostics: vec![],
                    error: None,
                    fix: None,
                },
            ],
        }
    }

    #[test]
    fn test_render_report() {
        let output = render_report(&sample_run(), &ReportOptions::default()).unwrap();

        assert!(output.starts_with("# Documentation Lint Report\n# Generated: "));
        assert!(output.contains("azurerm_redis_cache (docs/redis_cache.html.markdown)\n"));
        assert!(output.contains(
            "  docs/redis_cache.html.markdown:31: [force_new] changing `name` should be documented to force a new resource\n"
        ));
        assert!(!output.contains("zones"));
        assert!(!output.contains("azurerm_clean"));
        assert!(output.contains("  force_new: 1\n"));
        assert!(output.contains("Total: 1 issue(s), 1 skipped, 0 error(s) in 2 resource(s)"));
    }

    #[test]
    fn test_verbose_shows_skipped() {
        let output = render_report(&sample_run(), &ReportOptions { verbose: true }).unwrap();
        assert!(output.contains(
            "  docs/redis_cache.html.markdown: [missing_in_doc] `zones` is missing in the documentation (skipped)\n"
        ));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&sample_run()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reports"][0]["diagnostics"][0]["kind"], "force_new");
        assert_eq!(value["reports"][0]["diagnostics"][0]["expected"], true);
        assert_eq!(value["reports"][0]["diagnostics"][1]["line"], serde_json::Value::Null);
    }
}
