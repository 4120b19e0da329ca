//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use storefront_probe::{Outcome, ScenarioReport, SuiteReport};

use crate::error::CliResult;

/// Output format for suite reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Progress reporter for scenario execution
///
/// Writes to stderr so stdout carries only the report.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Start a spinner while scenarios run
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    /// Stop and clear the spinner
    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // failures print even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}

// =============================================================================
// REPORT RENDERING
// =============================================================================

/// Render a suite report in `format`
pub fn render_report(report: &SuiteReport, format: OutputFormat, use_color: bool) -> CliResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, use_color)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Human-readable report: one line per scenario, failure details, summary
#[must_use]
pub fn render_text(report: &SuiteReport, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "run {} ({})", report.run_id, report.started_at.to_rfc3339());
    for scenario in &report.scenarios {
        render_scenario(&mut out, scenario, use_color);
    }
    if report.aborted {
        let _ = writeln!(out, "run aborted by a configuration error");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", summary_line(report, use_color));
    out
}

fn render_scenario(out: &mut String, scenario: &ScenarioReport, use_color: bool) {
    let (mark, color) = match scenario.outcome {
        Outcome::Passed => ("PASS", Style::new().green().bold()),
        Outcome::Failed(_) => ("FAIL", Style::new().red().bold()),
        Outcome::Skipped => ("SKIP", Style::new().yellow()),
    };
    let mark = if use_color {
        color.apply_to(mark).to_string()
    } else {
        mark.to_string()
    };
    let _ = writeln!(
        out,
        "{mark} {} ({} steps, {} ms)",
        scenario.name, scenario.steps_completed, scenario.duration_ms
    );
    if let Some(failure) = scenario.failure() {
        let _ = writeln!(out, "     step:     {}", failure.step);
        let _ = writeln!(out, "     error:    {}", failure.message);
        if let (Some(expected), Some(observed)) = (&failure.expected, &failure.observed) {
            let _ = writeln!(out, "     expected: {expected:?}");
            let _ = writeln!(out, "     observed: {observed:?}");
        }
    }
}

fn summary_line(report: &SuiteReport, use_color: bool) -> String {
    let passed = report.passed_count();
    let failed = report.failed_count();
    let skipped = report.total() - passed - failed;
    let status = if report.all_passed() { "PASSED" } else { "FAILED" };
    let status = if !use_color {
        status.to_string()
    } else if report.all_passed() {
        Style::new().green().bold().apply_to(status).to_string()
    } else {
        Style::new().red().bold().apply_to(status).to_string()
    };
    format!(
        "{status} {} scenarios ({passed} passed, {failed} failed, {skipped} skipped)",
        report.total()
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn report(json: &str) -> SuiteReport {
        serde_json::from_str(json).unwrap()
    }

    fn mixed_report() -> SuiteReport {
        report(
            r#"{
                "run_id": "3f2a4c1e-8a4b-4c55-9d1f-0e6b2a7c9d10",
                "started_at": "2026-10-15T09:30:00Z",
                "aborted": false,
                "scenarios": [
                    {"name": "component-navigation", "outcome": {"status": "passed"},
                     "steps_completed": 5, "duration_ms": 812},
                    {"name": "purchase-flow",
                     "outcome": {"status": "failed", "step": "validate checkout amount",
                                 "phase": "running", "kind": "assertion_mismatch",
                                 "message": "Assertion failed for order total",
                                 "expected": "$602.00", "observed": "$607.00"},
                     "steps_completed": 16, "duration_ms": 4210}
                ]
            }"#,
        )
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_lists_each_scenario() {
            let text = render_text(&mixed_report(), false);
            assert!(text.contains("PASS component-navigation (5 steps, 812 ms)"));
            assert!(text.contains("FAIL purchase-flow (16 steps, 4210 ms)"));
        }

        #[test]
        fn test_failure_details_include_expected_and_observed() {
            let text = render_text(&mixed_report(), false);
            assert!(text.contains("step:     validate checkout amount"));
            assert!(text.contains("expected: \"$602.00\""));
            assert!(text.contains("observed: \"$607.00\""));
        }

        #[test]
        fn test_summary_counts() {
            let text = render_text(&mixed_report(), false);
            assert!(text.contains("FAILED 2 scenarios (1 passed, 1 failed, 0 skipped)"));
        }

        #[test]
        fn test_aborted_run_reports_skips() {
            let aborted = report(
                r#"{
                    "run_id": "3f2a4c1e-8a4b-4c55-9d1f-0e6b2a7c9d10",
                    "started_at": "2026-10-15T09:30:00Z",
                    "aborted": true,
                    "scenarios": [
                        {"name": "component-navigation",
                         "outcome": {"status": "failed", "step": "isolation reset",
                                     "phase": "reset", "kind": "configuration",
                                     "message": "Configuration error: bad locator"},
                         "steps_completed": 0, "duration_ms": 3},
                        {"name": "purchase-flow", "outcome": {"status": "skipped"},
                         "steps_completed": 0, "duration_ms": 0}
                    ]
                }"#,
            );
            let text = render_text(&aborted, false);
            assert!(text.contains("SKIP purchase-flow"));
            assert!(text.contains("run aborted"));
            assert!(text.contains("(0 passed, 1 failed, 1 skipped)"));
            assert!(!text.contains("expected:"));
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn test_json_is_the_serialized_report() {
            let original = mixed_report();
            let json = render_report(&original, OutputFormat::Json, false).unwrap();
            let parsed: SuiteReport = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, original);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_quiet_mode_suppresses_spinner() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_spinner("running");
            assert!(reporter.spinner.is_none());
            reporter.success("hidden");
            reporter.failure("shown");
            reporter.finish();
        }
    }
}
