//! Storefront Probe CLI: end-to-end storefront checks
//!
//! ## Usage
//!
//! ```bash
//! storefront-probe run                                 # All scenarios, headless Chromium
//! storefront-probe run --scenario purchase-flow --headed
//! storefront-probe run --offline --format json         # Built-in demo storefront
//! storefront-probe check-config --config suite.yaml
//! storefront-probe list
//! ```

use clap::Parser;
use std::process::ExitCode;
use storefront_probe_cli::{
    init_tracing, render_report, report_status, Cli, CliConfig, CliResult, ColorChoice, Commands,
    OutputFormat, SuiteRunner, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::Run(args) => {
            let format = OutputFormat::from(args.format);
            let use_color = config.color.should_color();
            let mut runner = SuiteRunner::new(config);
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let report = runtime.block_on(runner.run(&args))?;
            println!("{}", render_report(&report, format, use_color)?);
            report_status(&report)
        }
        Commands::List => {
            println!("{}", SuiteRunner::list()?);
            Ok(())
        }
        Commands::CheckConfig(args) => {
            let runner = SuiteRunner::new(config);
            println!("{}", runner.check_config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_json(cli.log_json)
}
