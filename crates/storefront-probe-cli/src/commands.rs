//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use storefront_probe::ScenarioSelection;

use crate::config::ColorChoice;
use crate::output::OutputFormat;

/// Storefront Probe: end-to-end checks for an OpenCart storefront
#[derive(Parser, Debug)]
#[command(name = "storefront-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run storefront scenarios
    Run(RunArgs),

    /// List scenarios with their descriptions
    List,

    /// Validate configuration, locator overrides and the fixture
    CheckConfig(CheckConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Scenario to run
    #[arg(short, long, default_value = "all")]
    pub scenario: ScenarioArg,

    /// Suite configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fixture directory, overriding configuration and environment
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Run against the built-in demo storefront instead of a browser
    #[arg(long)]
    pub offline: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the Chromium binary
    #[arg(long, env = "CHROMIUM_PATH")]
    pub chromium_path: Option<PathBuf>,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Run each scenario in its own browser session, concurrently
    #[arg(long)]
    pub isolated: bool,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the check-config command
#[derive(Parser, Debug)]
pub struct CheckConfigArgs {
    /// Suite configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fixture directory, overriding configuration and environment
    #[arg(long)]
    pub fixtures: Option<PathBuf>,
}

/// Scenario selection argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScenarioArg {
    /// Every scenario, in suite order
    #[default]
    All,
    /// Search and result titles
    ComponentNavigation,
    /// Review, cart, login and checkout total
    PurchaseFlow,
}

impl From<ScenarioArg> for ScenarioSelection {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::All => Self::All,
            ScenarioArg::ComponentNavigation => Self::ComponentNavigation,
            ScenarioArg::PurchaseFlow => Self::PurchaseFlow,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// Serialized suite report
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Detect terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::unreachable)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("storefront-probe").chain(args.iter().copied()))
            .unwrap()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_run_defaults() {
            let cli = parse(&["run"]);
            let Commands::Run(args) = cli.command else {
                unreachable!("run parses to Commands::Run");
            };
            assert_eq!(args.scenario, ScenarioArg::All);
            assert_eq!(args.format, FormatArg::Text);
            assert!(!args.offline);
            assert!(!args.isolated);
            assert!(args.config.is_none());
        }

        #[test]
        fn test_run_with_all_flags() {
            let cli = parse(&[
                "-vv",
                "--log-json",
                "run",
                "--scenario",
                "purchase-flow",
                "--config",
                "suite.yaml",
                "--fixtures",
                "data",
                "--offline",
                "--isolated",
                "--format",
                "json",
            ]);
            assert_eq!(cli.verbose, 2);
            assert!(cli.log_json);
            let Commands::Run(args) = cli.command else {
                unreachable!("run parses to Commands::Run");
            };
            assert_eq!(args.scenario, ScenarioArg::PurchaseFlow);
            assert_eq!(args.config, Some(PathBuf::from("suite.yaml")));
            assert_eq!(args.fixtures, Some(PathBuf::from("data")));
            assert!(args.offline);
            assert!(args.isolated);
            assert_eq!(args.format, FormatArg::Json);
        }

        #[test]
        fn test_unknown_scenario_rejected() {
            let result = Cli::try_parse_from(["storefront-probe", "run", "--scenario", "wishlist"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_list_and_check_config() {
            assert!(matches!(parse(&["list"]).command, Commands::List));
            let cli = parse(&["check-config", "--config", "suite.yaml"]);
            let Commands::CheckConfig(args) = cli.command else {
                unreachable!("check-config parses to Commands::CheckConfig");
            };
            assert_eq!(args.config, Some(PathBuf::from("suite.yaml")));
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_scenario_arg_matches_selection_names() {
            for arg in [
                ScenarioArg::All,
                ScenarioArg::ComponentNavigation,
                ScenarioArg::PurchaseFlow,
            ] {
                let name = arg.to_possible_value().unwrap().get_name().to_string();
                let selection = ScenarioSelection::from(arg);
                assert_eq!(selection.to_string(), name);
            }
        }

        #[test]
        fn test_color_arg() {
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
        }
    }
}
