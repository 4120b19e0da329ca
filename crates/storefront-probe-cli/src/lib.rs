//! Storefront Probe CLI Library
//!
//! Command-line interface for running storefront scenarios against a real
//! browser or the built-in offline storefront.

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{CheckConfigArgs, Cli, ColorArg, Commands, FormatArg, RunArgs, ScenarioArg};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{render_report, render_text, OutputFormat, ProgressReporter};
pub use runner::{load_suite_config, report_status, SuiteRunner, REQUIRED_FIXTURE_FIELDS};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the verbosity-derived default filter. Logs go to
/// stderr so reports on stdout stay machine-readable.
pub fn init_tracing(config: &CliConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.default_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let installed = if config.log_json {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
