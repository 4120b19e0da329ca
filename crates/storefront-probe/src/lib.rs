//! Storefront Probe: page objects and flow assertions for e2e storefront tests
//!
//! Drives a browser through discovery, review, cart, login and checkout on an
//! OpenCart shop and asserts what the customer sees at every step.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  STOREFRONT PROBE Architecture                   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ Storefront │            │
//! │   │ Engine     │───►│ Objects    │───►│ Driver     │            │
//! │   │ (harness)  │    │ (pages)    │    │ (CDP/mock) │            │
//! │   └─────┬──────┘    └─────┬──────┘    └────────────┘            │
//! │         │ fixture         │ locators                            │
//! │   ┌─────▼──────┐    ┌─────▼──────┐    ┌────────────┐            │
//! │   │ Fixture    │    │ Locator    │    │ Assertion  │            │
//! │   │ Binder     │    │ Resolver   │    │ Layer      │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! let suite = StorefrontSuite::new(SuiteConfig::default().with_env_overrides())?;
//! let mut session = suite.harness().session(Box::new(MockStorefront::demo()));
//! let report = suite.run_all(&mut session).await;
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]

mod assertion;
mod browser;
mod config;
mod driver;
mod fixture;
mod harness;
mod locator;
mod mock;
mod money;
mod page_object;
pub mod pages;
mod result;
mod scenarios;
mod session;
mod wait;

pub use assertion::{
    expect_amount, expect_contains, expect_count, expect_text, Assertion, AssertionResult,
};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{CdpDriver, CdpSessionFactory};
pub use config::{
    Credentials, LocatorOverrides, SettleTimes, SuiteConfig, DEFAULT_BASE_URL,
    DEFAULT_URL_MARKER,
};
pub use driver::{ElementHandle, SessionFactory, StorageSnapshot, StorefrontDriver};
pub use fixture::{FixtureBinder, FixtureRecord};
pub use harness::{
    Outcome, Phase, Scenario, ScenarioContext, ScenarioReport, StepFailure, SuiteReport,
    TestHarness, RESET_STEP,
};
pub use locator::{
    Locator, LocatorMap, LocatorOptions, Selector, SelectorSpec, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_TIMEOUT_MS,
};
pub use mock::{CallLog, MockProduct, MockSite, MockStorefront, LOGIN_REJECTED, REVIEW_ACCEPTED};
pub use money::Money;
pub use page_object::{PageObject, Pages};
pub use result::{ErrorKind, ProbeError, ProbeResult};
pub use scenarios::{
    ComponentNavigation, PurchaseExpectations, PurchaseFlow, ScenarioSelection, StorefrontSuite,
};
pub use session::{ElementSequence, Session};
pub use wait::{settle, Deadline, WaitOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::pages::{
        CheckoutRegion, HomeRegion, LoginRegion, NavbarRegion, ProductRegion,
    };
    pub use super::{
        MockSite, MockStorefront, PageObject, Pages, ProbeError, ProbeResult, Scenario,
        ScenarioContext, Session, StorefrontSuite, SuiteConfig, SuiteReport,
    };
}
