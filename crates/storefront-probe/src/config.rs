//! Suite configuration.
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `STOREFRONT_BASE_URL` | `base_url` |
//! | `STOREFRONT_LOGIN_EMAIL` | `valid_login.email` |
//! | `STOREFRONT_LOGIN_PASSWORD` | `valid_login.password` |
//! | `STOREFRONT_FIXTURES` | `fixture_dir` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fixture::FixtureBinder;
use crate::locator::{SelectorSpec, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;

/// Entry URL of the reference shop
pub const DEFAULT_BASE_URL: &str = "https://demo.codenbox.com/";
/// Substring the entry URL must contain after navigation
pub const DEFAULT_URL_MARKER: &str = "demo";
/// Account accepted by the reference shop
pub const DEFAULT_VALID_EMAIL: &str = "probe.shopper@example.com";
/// Password of [`DEFAULT_VALID_EMAIL`]
pub const DEFAULT_VALID_PASSWORD: &str = "Probe#Shopper1";
/// Account that must be rejected
pub const DEFAULT_INVALID_EMAIL: &str = "nobody@example.invalid";
/// Password paired with [`DEFAULT_INVALID_EMAIL`]
pub const DEFAULT_INVALID_PASSWORD: &str = "not-the-password";

/// Settle after opening the reviews tab
pub const DEFAULT_REVIEWS_SETTLE_MS: u64 = 500;
/// Settle before opening the cart dropdown
pub const DEFAULT_CART_SETTLE_MS: u64 = 2000;
/// Overall budget for one scenario
pub const DEFAULT_SCENARIO_BUDGET_MS: u64 = 120_000;

/// Email/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Fixed pauses where the storefront gives no readiness signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleTimes {
    /// After opening the reviews tab
    pub reviews: Duration,
    /// Before opening the cart dropdown
    pub cart: Duration,
}

impl Default for SettleTimes {
    fn default() -> Self {
        Self {
            reviews: Duration::from_millis(DEFAULT_REVIEWS_SETTLE_MS),
            cart: Duration::from_millis(DEFAULT_CART_SETTLE_MS),
        }
    }
}

/// Locator overrides: region -> locator name -> selector
pub type LocatorOverrides = BTreeMap<String, BTreeMap<String, SelectorSpec>>;

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Storefront entry URL
    pub base_url: String,
    /// Substring the URL must contain after the initial navigation
    pub url_marker: String,
    /// Condition wait timeout
    pub timeout_ms: u64,
    /// Condition polling interval
    pub poll_interval_ms: u64,
    /// Settle after opening the reviews tab
    pub reviews_settle_ms: u64,
    /// Settle before opening the cart dropdown
    pub cart_settle_ms: u64,
    /// Overall budget per scenario
    pub scenario_budget_ms: u64,
    /// Directory holding fixture files
    pub fixture_dir: PathBuf,
    /// Fixture loaded for every scenario
    pub fixture_name: String,
    /// Credentials expected to log in
    pub valid_login: Credentials,
    /// Credentials expected to be rejected
    pub invalid_login: Credentials,
    /// Selector overrides per region
    pub locators: LocatorOverrides,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            url_marker: DEFAULT_URL_MARKER.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reviews_settle_ms: DEFAULT_REVIEWS_SETTLE_MS,
            cart_settle_ms: DEFAULT_CART_SETTLE_MS,
            scenario_budget_ms: DEFAULT_SCENARIO_BUDGET_MS,
            fixture_dir: PathBuf::from("fixtures"),
            fixture_name: "testData".to_string(),
            valid_login: Credentials::new(DEFAULT_VALID_EMAIL, DEFAULT_VALID_PASSWORD),
            invalid_login: Credentials::new(DEFAULT_INVALID_EMAIL, DEFAULT_INVALID_PASSWORD),
            locators: LocatorOverrides::new(),
        }
    }
}

impl SuiteConfig {
    /// Parse YAML configuration
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] on malformed YAML or unknown keys.
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ProbeError::configuration(e.to_string()))
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `STOREFRONT_*` overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `STOREFRONT_*` overrides from any lookup
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = lookup("STOREFRONT_BASE_URL") {
            self.base_url = url;
        }
        if let Some(email) = lookup("STOREFRONT_LOGIN_EMAIL") {
            self.valid_login.email = email;
        }
        if let Some(password) = lookup("STOREFRONT_LOGIN_PASSWORD") {
            self.valid_login.password = password;
        }
        if let Some(dir) = lookup("STOREFRONT_FIXTURES") {
            self.fixture_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check values that would make every scenario meaningless
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] describing the first bad value.
    pub fn validate(&self) -> ProbeResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.url_marker.is_empty() {
            return Err(ProbeError::configuration("url_marker must not be empty"));
        }
        if self.timeout_ms == 0 || self.poll_interval_ms == 0 {
            return Err(ProbeError::configuration(
                "timeout_ms and poll_interval_ms must be positive",
            ));
        }
        if self.scenario_budget_ms < self.timeout_ms {
            return Err(ProbeError::configuration(format!(
                "scenario_budget_ms ({}) is shorter than one wait ({})",
                self.scenario_budget_ms, self.timeout_ms
            )));
        }
        if self.fixture_name.is_empty() {
            return Err(ProbeError::configuration("fixture_name must not be empty"));
        }
        if self.valid_login == self.invalid_login {
            return Err(ProbeError::configuration(
                "valid_login and invalid_login must differ",
            ));
        }
        Ok(())
    }

    /// Wait policy for condition waits
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    /// Settle pauses
    #[must_use]
    pub const fn settle_times(&self) -> SettleTimes {
        SettleTimes {
            reviews: Duration::from_millis(self.reviews_settle_ms),
            cart: Duration::from_millis(self.cart_settle_ms),
        }
    }

    /// Overall budget per scenario
    #[must_use]
    pub const fn scenario_budget(&self) -> Duration {
        Duration::from_millis(self.scenario_budget_ms)
    }

    /// Binder over the configured fixture directory
    #[must_use]
    pub fn fixture_binder(&self) -> FixtureBinder {
        FixtureBinder::new(&self.fixture_dir)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_reference_shop() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "https://demo.codenbox.com/");
        assert_eq!(config.wait_options().timeout, Duration::from_millis(8000));
        assert_eq!(config.settle_times(), SettleTimes::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SuiteConfig::from_yaml_str(
            "timeout_ms: 2000\nvalid_login:\n  email: a@b.c\n  password: pw\n",
        )
        .unwrap();
        assert_eq!(config.timeout_ms, 2000);
        assert_eq!(config.valid_login.email, "a@b.c");
        assert_eq!(config.fixture_name, "testData");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SuiteConfig::from_yaml_str("timeout: 2000\n").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_locator_overrides_parse_all_forms() {
        let yaml = r##"
locators:
  product:
    price: "#content .price"
    reviews_tab: { css: "#content .nav-link", text: "Reviews" }
  login:
    warning: { xpath: "//div[@id='alert']" }
"##;
        let config = SuiteConfig::from_yaml_str(yaml).unwrap();
        let product = &config.locators["product"];
        assert_eq!(product["price"], SelectorSpec::Css("#content .price".into()));
        assert!(matches!(product["reviews_tab"], SelectorSpec::WithText { .. }));
        assert!(matches!(
            config.locators["login"]["warning"],
            SelectorSpec::XPath { .. }
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOREFRONT_BASE_URL", "http://localhost:8080/demo/"),
            ("STOREFRONT_LOGIN_PASSWORD", "secret"),
            ("STOREFRONT_FIXTURES", "  "),
        ]
        .into_iter()
        .collect();
        let config = SuiteConfig::default()
            .with_overrides_from(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.base_url, "http://localhost:8080/demo/");
        assert_eq!(config.valid_login.password, "secret");
        assert_eq!(config.valid_login.email, DEFAULT_VALID_EMAIL);
        assert_eq!(config.fixture_dir, PathBuf::from("fixtures"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = SuiteConfig {
            base_url: "demo.codenbox.com".into(),
            ..SuiteConfig::default()
        };
        assert!(bad_url.validate().is_err());

        let same_logins = SuiteConfig {
            invalid_login: SuiteConfig::default().valid_login,
            ..SuiteConfig::default()
        };
        assert!(same_logins.validate().is_err());

        let tight_budget = SuiteConfig {
            scenario_budget_ms: 10,
            ..SuiteConfig::default()
        };
        assert!(tight_budget.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "fixture_name: reviews\n").unwrap();
        let config = SuiteConfig::load(file.path()).unwrap();
        assert_eq!(config.fixture_name, "reviews");
        let err = SuiteConfig::load(Path::new("/nonexistent/probe.yaml")).unwrap_err();
        assert!(matches!(err, ProbeError::Configuration { .. }));
        assert!(err.to_string().contains("/nonexistent/probe.yaml"));
    }
}
