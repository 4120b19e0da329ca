//! Command execution: configuration loading, offline and browser runs

use std::path::Path;
use storefront_probe::{
    MockSite, MockStorefront, Scenario, ScenarioSelection, Session, StorefrontSuite,
    SuiteConfig, SuiteReport,
};
use tracing::{debug, info, warn};

use crate::commands::{CheckConfigArgs, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;

/// Fixture fields the purchase flow reads
pub const REQUIRED_FIXTURE_FIELDS: [&str; 4] = ["name", "review", "successMessage", "warning"];

/// Load suite configuration from an optional file, then apply the
/// `STOREFRONT_*` environment and an optional fixture directory override
pub fn load_suite_config(path: Option<&Path>, fixtures: Option<&Path>) -> CliResult<SuiteConfig> {
    let config = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading suite configuration");
            SuiteConfig::load(path)?
        }
        None => SuiteConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(dir) = fixtures {
        config.fixture_dir = dir.to_path_buf();
    }
    config.validate()?;
    Ok(config)
}

/// Executes CLI commands
#[derive(Debug)]
pub struct SuiteRunner {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl SuiteRunner {
    /// Create a runner for `config`
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// CLI configuration in effect
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Scenario names and descriptions, one per line
    pub fn list() -> CliResult<String> {
        let suite = StorefrontSuite::new(SuiteConfig::default())?;
        let lines: Vec<String> = suite
            .scenarios(ScenarioSelection::All)
            .iter()
            .map(|s| format!("{:<22} {}", s.name(), s.description()))
            .collect();
        Ok(lines.join("\n"))
    }

    /// Validate configuration, locator overrides and the fixture without a
    /// browser
    pub fn check_config(&self, args: &CheckConfigArgs) -> CliResult<String> {
        let config = load_suite_config(args.config.as_deref(), args.fixtures.as_deref())?;
        let suite = StorefrontSuite::new(config.clone())?;
        let record = config.fixture_binder().load(&config.fixture_name)?;
        for field in REQUIRED_FIXTURE_FIELDS {
            let _ = record.get(field)?;
        }
        let overridden: usize = config.locators.values().map(|region| region.len()).sum();
        self.reporter.success("configuration is valid");
        Ok(format!(
            "base_url: {}\nfixture: {}\nregions: {}\nlocator overrides: {overridden}",
            config.base_url,
            config.fixture_binder().dir().join(&config.fixture_name).display(),
            suite.harness().pages().regions().len(),
        ))
    }

    /// Run the selected scenarios and return the report
    pub async fn run(&mut self, args: &RunArgs) -> CliResult<SuiteReport> {
        let mut config = load_suite_config(args.config.as_deref(), args.fixtures.as_deref())?;
        if args.offline {
            config.base_url = MockStorefront::BASE_URL.to_string();
        }
        let target = config.base_url.clone();
        let suite = StorefrontSuite::new(config)?;
        let selection = ScenarioSelection::from(args.scenario);
        info!(%selection, offline = args.offline, isolated = args.isolated, "starting run");
        self.reporter
            .info(&format!("{selection} scenarios against {target}"));

        self.reporter
            .start_spinner(&format!("running {selection} scenarios"));
        let report = if args.offline {
            Self::run_offline(&suite, selection, args.isolated).await
        } else {
            Self::run_browser(&suite, args, selection).await
        };
        self.reporter.finish();
        let report = report?;

        for scenario in &report.scenarios {
            match scenario.failure() {
                None if scenario.passed() => self.reporter.success(&scenario.name),
                None => self.reporter.warning(&format!("{} skipped", scenario.name)),
                Some(failure) => self
                    .reporter
                    .failure(&format!("{} at '{}'", scenario.name, failure.step)),
            }
        }
        Ok(report)
    }

    async fn run_offline(
        suite: &StorefrontSuite,
        selection: ScenarioSelection,
        isolated: bool,
    ) -> CliResult<SuiteReport> {
        let site = offline_site(suite.harness().config());
        if isolated {
            return Ok(suite.run_isolated(&site, selection).await);
        }
        let session = suite
            .harness()
            .session(Box::new(MockStorefront::from_site(site)));
        Ok(run_and_close(suite, session, selection).await)
    }

    #[cfg(feature = "browser")]
    async fn run_browser(
        suite: &StorefrontSuite,
        args: &RunArgs,
        selection: ScenarioSelection,
    ) -> CliResult<SuiteReport> {
        use storefront_probe::{BrowserConfig, CdpDriver, CdpSessionFactory};

        let mut browser = BrowserConfig::default().with_headless(!args.headed);
        if let Some(path) = &args.chromium_path {
            browser = browser.with_chromium_path(path.to_string_lossy());
        }
        if args.no_sandbox {
            browser = browser.with_no_sandbox();
        }
        if args.isolated {
            let factory = CdpSessionFactory::new(browser);
            return Ok(suite.run_isolated(&factory, selection).await);
        }
        let driver = CdpDriver::launch(&browser).await?;
        let session = suite.harness().session(Box::new(driver));
        Ok(run_and_close(suite, session, selection).await)
    }

    #[cfg(not(feature = "browser"))]
    async fn run_browser(
        _suite: &StorefrontSuite,
        _args: &RunArgs,
        _selection: ScenarioSelection,
    ) -> CliResult<SuiteReport> {
        Err(CliError::invalid_argument(
            "built without the browser feature; rebuild with --features browser or pass --offline",
        ))
    }
}

/// Demo storefront that accepts the configured login
fn offline_site(config: &SuiteConfig) -> MockSite {
    MockSite::demo().with_account(
        config.valid_login.email.clone(),
        config.valid_login.password.clone(),
    )
}

async fn run_and_close(
    suite: &StorefrontSuite,
    mut session: Session,
    selection: ScenarioSelection,
) -> SuiteReport {
    let report = suite.run_selected(&mut session, selection).await;
    if let Err(err) = session.close().await {
        warn!(error = %err, "session failed to close");
    }
    report
}

/// Map a finished report to the process result
pub fn report_status(report: &SuiteReport) -> CliResult<()> {
    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.total() - report.passed_count(),
            total: report.total(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{FormatArg, ScenarioArg};
    use crate::config::{ColorChoice, Verbosity};
    use std::fs;
    use std::path::PathBuf;
    use storefront_probe::{LOGIN_REJECTED, REVIEW_ACCEPTED};
    use tempfile::TempDir;

    fn fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let body = serde_json::json!({
            "name": "Jordan",
            "review": "Solid machine, the battery easily lasts a full working day.",
            "successMessage": REVIEW_ACCEPTED,
            "warning": LOGIN_REJECTED,
        });
        fs::write(dir.path().join("testData.json"), body.to_string()).unwrap();
        dir
    }

    fn quiet_runner() -> SuiteRunner {
        SuiteRunner::new(
            CliConfig::new()
                .with_verbosity(Verbosity::Quiet)
                .with_color(ColorChoice::Never),
        )
    }

    fn offline_args(fixtures: &Path, scenario: ScenarioArg, isolated: bool) -> RunArgs {
        RunArgs {
            scenario,
            config: None,
            fixtures: Some(fixtures.to_path_buf()),
            offline: true,
            headed: false,
            chromium_path: None,
            no_sandbox: false,
            isolated,
            format: FormatArg::Text,
        }
    }

    mod config_loading_tests {
        use super::*;

        #[test]
        fn test_fixture_flag_wins() {
            let config = load_suite_config(None, Some(Path::new("elsewhere"))).unwrap();
            assert_eq!(config.fixture_dir, PathBuf::from("elsewhere"));
        }

        #[test]
        fn test_config_file_is_read() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("suite.yaml");
            fs::write(&path, "timeout_ms: 2500\ncart_settle_ms: 10\n").unwrap();
            let config = load_suite_config(Some(&path), None).unwrap();
            assert_eq!(config.timeout_ms, 2500);
            assert_eq!(config.cart_settle_ms, 10);
        }

        #[test]
        fn test_missing_config_file_is_an_error() {
            let err = load_suite_config(Some(Path::new("/nonexistent/suite.yaml")), None)
                .unwrap_err();
            assert!(err.to_string().contains("suite.yaml"));
        }
    }

    mod list_tests {
        use super::*;

        #[test]
        fn test_lists_both_scenarios_in_order() {
            let listing = SuiteRunner::list().unwrap();
            let lines: Vec<&str> = listing.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with("component-navigation"));
            assert!(lines[1].starts_with("purchase-flow"));
        }
    }

    mod check_config_tests {
        use super::*;

        #[test]
        fn test_valid_setup() {
            let fixtures = fixture_dir();
            let args = CheckConfigArgs {
                config: None,
                fixtures: Some(fixtures.path().to_path_buf()),
            };
            let summary = quiet_runner().check_config(&args).unwrap();
            assert!(summary.contains("regions: 5"));
            assert!(summary.contains("locator overrides: 0"));
        }

        #[test]
        fn test_missing_fixture_field() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("testData.json"), r#"{"name": "Jordan"}"#).unwrap();
            let args = CheckConfigArgs {
                config: None,
                fixtures: Some(dir.path().to_path_buf()),
            };
            let err = quiet_runner().check_config(&args).unwrap_err();
            assert!(err.to_string().contains("review"));
        }

        #[test]
        fn test_unknown_locator_region() {
            let fixtures = fixture_dir();
            let path = fixtures.path().join("suite.yaml");
            fs::write(&path, "locators:\n  wishlist:\n    add: \"#wishlist\"\n").unwrap();
            let args = CheckConfigArgs {
                config: Some(path),
                fixtures: Some(fixtures.path().to_path_buf()),
            };
            let err = quiet_runner().check_config(&args).unwrap_err();
            assert!(err.to_string().contains("wishlist"));
        }
    }

    mod offline_run_tests {
        use super::*;

        #[tokio::test]
        async fn test_offline_run_passes() {
            let fixtures = fixture_dir();
            let args = offline_args(fixtures.path(), ScenarioArg::All, false);
            let report = quiet_runner().run(&args).await.unwrap();
            assert_eq!(report.total(), 2);
            assert!(report.all_passed(), "{report:?}");
            report_status(&report).unwrap();
        }

        #[tokio::test]
        async fn test_offline_isolated_single_scenario() {
            let fixtures = fixture_dir();
            let args = offline_args(fixtures.path(), ScenarioArg::ComponentNavigation, true);
            let report = quiet_runner().run(&args).await.unwrap();
            assert_eq!(report.total(), 1);
            assert!(report.scenario("component-navigation").unwrap().passed());
        }

        #[tokio::test]
        async fn test_offline_site_accepts_configured_login() {
            let fixtures = fixture_dir();
            let path = fixtures.path().join("suite.yaml");
            fs::write(
                &path,
                "valid_login:\n  email: jordan@example.com\n  password: \"Rotated#2\"\n",
            )
            .unwrap();
            let mut args = offline_args(fixtures.path(), ScenarioArg::PurchaseFlow, false);
            args.config = Some(path);
            let report = quiet_runner().run(&args).await.unwrap();
            assert!(report.all_passed(), "{report:?}");
        }

        #[tokio::test]
        async fn test_missing_fixture_fails_the_run() {
            let empty = TempDir::new().unwrap();
            let args = offline_args(empty.path(), ScenarioArg::PurchaseFlow, false);
            let report = quiet_runner().run(&args).await.unwrap();
            let err = report_status(&report).unwrap_err();
            assert_eq!(err.to_string(), "1 of 1 scenarios failed");
        }
    }
}
