//! Page Object Model support.
//!
//! Every UI region implements [`PageObject`]: a region name, the URL
//! fragment that identifies it, and the [`LocatorMap`] it owns. Region
//! behaviour lives in the per-region traits under [`crate::pages`].
//!
//! [`Pages`] bundles one instance of each region. It is built once per run
//! and shared read-only by every scenario.

use crate::config::{Credentials, LocatorOverrides, SettleTimes, SuiteConfig};
use crate::locator::{Locator, LocatorMap, Selector};
use crate::pages::{CheckoutPage, HomePage, LoginPage, Navbar, ProductPage};
use crate::result::{ProbeError, ProbeResult};

/// A page or component in the storefront UI
pub trait PageObject: std::fmt::Debug + Send + Sync {
    /// URL fragment identifying the page; empty for components on every page
    fn url_pattern(&self) -> &str;

    /// Locators owned by this region
    fn locators(&self) -> &LocatorMap;

    /// Mutable access for configuration overrides
    fn locators_mut(&mut self) -> &mut LocatorMap;

    /// Region name used in logs and configuration
    fn region(&self) -> &str {
        self.locators().region()
    }

    /// Resolve a locator by semantic name
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] for an undefined name.
    fn locator(&self, name: &str) -> ProbeResult<&Locator> {
        self.locators().resolve(name)
    }

    /// Whether `url` belongs to this page
    fn matches_url(&self, url: &str) -> bool {
        url.contains(self.url_pattern())
    }
}

/// One instance of every region
#[derive(Debug, Clone)]
pub struct Pages {
    /// Header component
    pub navbar: Navbar,
    /// Landing page
    pub home: HomePage,
    /// Product detail page
    pub product: ProductPage,
    /// Checkout page
    pub checkout: CheckoutPage,
    /// Login page
    pub login: LoginPage,
}

impl Pages {
    /// Build all regions with their default locators
    #[must_use]
    pub fn new(settle: SettleTimes, valid: Credentials, invalid: Credentials) -> Self {
        Self {
            navbar: Navbar::new(),
            home: HomePage::new(),
            product: ProductPage::new(settle),
            checkout: CheckoutPage::new(),
            login: LoginPage::new(valid, invalid),
        }
    }

    /// Build all regions from configuration, applying locator overrides
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] if an override names an unknown
    /// region or locator.
    pub fn from_config(config: &SuiteConfig) -> ProbeResult<Self> {
        let mut pages = Self::new(
            config.settle_times(),
            config.valid_login.clone(),
            config.invalid_login.clone(),
        );
        pages.apply_overrides(&config.locators)?;
        Ok(pages)
    }

    /// Replace selectors named in `overrides`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] if an override names an unknown
    /// region or locator.
    pub fn apply_overrides(&mut self, overrides: &LocatorOverrides) -> ProbeResult<()> {
        for (region, selectors) in overrides {
            let page = self.region_mut(region).ok_or_else(|| {
                ProbeError::configuration(format!("unknown region '{region}' in locator overrides"))
            })?;
            for (name, spec) in selectors {
                page.locators_mut()
                    .override_selector(name, Selector::from(spec.clone()))?;
            }
        }
        Ok(())
    }

    /// All regions, header first
    #[must_use]
    pub fn regions(&self) -> [&dyn PageObject; 5] {
        [
            &self.navbar,
            &self.home,
            &self.product,
            &self.checkout,
            &self.login,
        ]
    }

    fn region_mut(&mut self, region: &str) -> Option<&mut dyn PageObject> {
        let page: &mut dyn PageObject = match region {
            "navbar" => &mut self.navbar,
            "home" => &mut self.home,
            "product" => &mut self.product,
            "checkout" => &mut self.checkout,
            "login" => &mut self.login,
            _ => return None,
        };
        Some(page)
    }
}

impl Default for Pages {
    fn default() -> Self {
        let config = SuiteConfig::default();
        Self::new(
            config.settle_times(),
            config.valid_login,
            config.invalid_login,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::SelectorSpec;
    use std::collections::BTreeMap;

    fn overrides(region: &str, name: &str, spec: SelectorSpec) -> LocatorOverrides {
        let mut inner = BTreeMap::new();
        let _ = inner.insert(name.to_string(), spec);
        let mut outer = LocatorOverrides::new();
        let _ = outer.insert(region.to_string(), inner);
        outer
    }

    #[test]
    fn test_region_names_are_unique() {
        let pages = Pages::default();
        let mut names: Vec<_> = pages.regions().iter().map(|p| p.region().to_string()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names, vec!["checkout", "home", "login", "navbar", "product"]);
    }

    #[test]
    fn test_every_region_has_locators() {
        for page in Pages::default().regions() {
            assert!(!page.locators().is_empty(), "{} has no locators", page.region());
        }
    }

    #[test]
    fn test_url_patterns() {
        let pages = Pages::default();
        assert!(pages.checkout.matches_url(
            "https://demo.codenbox.com/index.php?route=checkout/checkout&language=en-gb"
        ));
        assert!(!pages.login.matches_url("https://demo.codenbox.com/"));
        assert!(pages.navbar.matches_url("about:blank"));
    }

    #[test]
    fn test_override_replaces_selector() {
        let mut pages = Pages::default();
        pages
            .apply_overrides(&overrides(
                "product",
                "price",
                SelectorSpec::Css("#content .price".into()),
            ))
            .unwrap();
        let price = pages.product.locator("price").unwrap();
        assert_eq!(price.selector(), &Selector::css("#content .price"));
        assert_eq!(price.name(), "price");
    }

    #[test]
    fn test_override_unknown_region_or_name_is_fatal() {
        let mut pages = Pages::default();
        let err = pages
            .apply_overrides(&overrides("footer", "x", SelectorSpec::Css("x".into())))
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("footer"));

        let err = pages
            .apply_overrides(&overrides("login", "captcha", SelectorSpec::Css("x".into())))
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("captcha"));
    }

    #[test]
    fn test_undefined_locator_is_configuration_error() {
        let pages = Pages::default();
        let err = pages.home.locator("carousel").unwrap_err();
        assert!(matches!(err, ProbeError::Configuration { .. }));
    }
}
