//! Locator abstraction: semantic element names mapped to selectors.
//!
//! A [`LocatorMap`] only stores the mapping. Resolution against the DOM
//! happens in the driver, on every call, so page objects never hold on to
//! element handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::result::{ProbeError, ProbeResult};

/// Default timeout for condition waits (8 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

/// Default polling interval for condition waits (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "#button-cart")
    Css(String),
    /// CSS selector filtered to elements whose text contains `text`
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// XPath selector
    XPath(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a CSS selector filtered by contained text
    #[must_use]
    pub fn contains(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// JavaScript expression evaluating to an array of the matched elements
    #[must_use]
    pub fn to_js_collect(&self) -> String {
        match self {
            Self::Css(css) => {
                format!("Array.from(document.querySelectorAll({}))", js_str(css))
            }
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
                js_str(css),
                js_str(text)
            ),
            Self::XPath(expr) => format!(
                "(() => {{ const r = document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)); }})()",
                js_str(expr)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::CssWithText { css, text } => write!(f, "{css}:contains({text:?})"),
            Self::XPath(expr) => write!(f, "xpath={expr}"),
        }
    }
}

/// Quote a string as a JavaScript literal
pub(crate) fn js_str(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}

/// Selector as written in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    /// Plain CSS selector
    Css(String),
    /// CSS selector filtered by text
    WithText {
        /// Base CSS selector
        css: String,
        /// Text the element must contain
        text: String,
    },
    /// XPath expression
    XPath {
        /// XPath expression
        xpath: String,
    },
}

impl From<SelectorSpec> for Selector {
    fn from(spec: SelectorSpec) -> Self {
        match spec {
            SelectorSpec::Css(css) => Self::Css(css),
            SelectorSpec::WithText { css, text } => Self::CssWithText { css, text },
            SelectorSpec::XPath { xpath } => Self::XPath(xpath),
        }
    }
}

/// Locator options for customizing wait behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Per-locator timeout; `None` uses the session default
    pub timeout: Option<Duration>,
    /// Whether the element must be visible to count as present
    pub visible: bool,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            visible: true,
        }
    }
}

/// A named selector owned by a page object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    name: String,
    selector: Selector,
    options: LocatorOptions,
}

impl Locator {
    /// Create a new locator
    #[must_use]
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
            options: LocatorOptions::default(),
        }
    }

    /// Set a custom timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Set visibility requirement
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.options.visible = visible;
        self
    }

    /// Semantic name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the options
    #[must_use]
    pub const fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Same locator with a different selector, keeping name and options
    #[must_use]
    pub fn retarget(&self, selector: Selector) -> Self {
        Self {
            name: self.name.clone(),
            selector,
            options: self.options.clone(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}

/// Semantic name -> locator table for one UI region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorMap {
    region: String,
    locators: BTreeMap<String, Locator>,
}

impl LocatorMap {
    /// Create an empty map for a region
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            locators: BTreeMap::new(),
        }
    }

    /// Add a locator with a name
    #[must_use]
    pub fn with(self, name: &str, selector: Selector) -> Self {
        self.with_locator(Locator::new(name, selector))
    }

    /// Add a prepared locator
    #[must_use]
    pub fn with_locator(mut self, locator: Locator) -> Self {
        let _ = self.locators.insert(locator.name.clone(), locator);
        self
    }

    /// Region this map belongs to
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Look up a locator by semantic name
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] for an undefined name.
    pub fn resolve(&self, name: &str) -> ProbeResult<&Locator> {
        self.locators.get(name).ok_or_else(|| {
            ProbeError::configuration(format!(
                "region '{}' defines no locator '{name}'",
                self.region
            ))
        })
    }

    /// Replace the selector of an existing locator
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] if `name` is not defined.
    pub fn override_selector(&mut self, name: &str, selector: Selector) -> ProbeResult<()> {
        let retargeted = self.resolve(name)?.retarget(selector);
        let _ = self.locators.insert(name.to_string(), retargeted);
        Ok(())
    }

    /// Get all locator names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.locators.keys().map(String::as_str).collect()
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}
