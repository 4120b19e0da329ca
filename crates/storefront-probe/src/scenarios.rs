//! The storefront smoke suite: component navigation and the purchase flow.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::assertion::{expect_contains, expect_count, expect_text, Assertion};
use crate::config::SuiteConfig;
use crate::driver::SessionFactory;
use crate::harness::{Scenario, ScenarioContext, ScenarioReport, SuiteReport, TestHarness};
use crate::money::Money;
use crate::page_object::PageObject;
use crate::pages::{CheckoutRegion, HomeRegion, LoginRegion, NavbarRegion, ProductRegion};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;

// =============================================================================
// COMPONENT NAVIGATION
// =============================================================================

/// Search, then walk the header links: account menu, login, logo
#[derive(Debug, Clone)]
pub struct ComponentNavigation {
    /// Search term every result must contain
    pub term: String,
}

impl ComponentNavigation {
    /// Scenario identifier
    pub const NAME: &'static str = "component-navigation";
}

impl Default for ComponentNavigation {
    fn default() -> Self {
        Self {
            term: "MacBook".to_string(),
        }
    }
}

#[async_trait]
impl Scenario for ComponentNavigation {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "search the catalog, then use the account menu, login link and logo"
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
        let navbar = &ctx.pages().navbar;
        let term = self.term.as_str();

        ctx.step(format!("search for {term}"));
        let _ = navbar.search_product(ctx.session(), term).await?;

        ctx.step("every result names the term");
        let mut results = navbar
            .validate_all_search_results(ctx.session(), term)
            .await?;
        while let Some(title) = results.next(ctx.session()).await? {
            expect_contains("search result title", term, &title.text)?;
        }

        ctx.step("open account menu");
        navbar.click_on_my_account(ctx.session()).await?;

        ctx.step("open login from account menu");
        navbar.click_on_login(ctx.session()).await?;

        ctx.step("return home via logo");
        navbar.click_on_logo(ctx.session()).await?;
        let url = ctx.session().current_url().await?;
        Assertion::is_true("landing page after logo", ctx.pages().home.matches_url(&url))
            .into_result()
    }
}

// =============================================================================
// PURCHASE FLOW
// =============================================================================

/// Literal expectations of the purchase flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseExpectations {
    /// Product to buy
    pub product: String,
    /// Displayed unit price
    pub price: String,
    /// Label of the description tab
    pub description_tab: String,
    /// Leading description text
    pub description_text: String,
    /// Products featured on the home page
    pub featured_count: usize,
    /// Marker in the add-to-cart alert
    pub cart_success: String,
    /// Units added to the cart
    pub quantity: u32,
}

impl Default for PurchaseExpectations {
    fn default() -> Self {
        Self {
            product: "MacBook".to_string(),
            price: "$602.00".to_string(),
            description_tab: "Description".to_string(),
            description_text: "Intel Core 2 Duo processor".to_string(),
            featured_count: 4,
            cart_success: "Success".to_string(),
            quantity: 1,
        }
    }
}

/// Discovery, review, cart, login and checkout in one flow
#[derive(Debug, Clone, Default)]
pub struct PurchaseFlow {
    /// Values the flow asserts
    pub expect: PurchaseExpectations,
}

impl PurchaseFlow {
    /// Scenario identifier
    pub const NAME: &'static str = "purchase-flow";
}

#[async_trait]
impl Scenario for PurchaseFlow {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "pick a product, review it, add it to the cart, log in and check the order total"
    }

    async fn run(&self, ctx: &mut ScenarioContext<'_>) -> ProbeResult<()> {
        let pages = ctx.pages();
        let expect = &self.expect;

        // discovery
        ctx.step("home lists featured products");
        let products = pages.home.display_products(ctx.session()).await?;
        expect_count("featured products", expect.featured_count, products.len())?;

        ctx.step(format!("select {}", expect.product));
        pages.home.select_products(ctx.session(), &expect.product).await?;

        // product details
        ctx.step("product name");
        let name = pages.product.get_product_name(ctx.session()).await?;
        expect_text("product name", &expect.product, &name)?;

        ctx.step("product price");
        let price = pages.product.get_product_price(ctx.session()).await?;
        expect_text("product price", &expect.price, &price)?;
        let unit_price: Money = price.parse()?;

        ctx.step("description tab");
        let tab = pages.product.get_product_description(ctx.session()).await?;
        expect_text("description tab", &expect.description_tab, &tab)?;

        ctx.step("description text");
        let description = pages.product.validate_product_description(ctx.session()).await?;
        expect_text("description text", &expect.description_text, &description)?;

        // review
        ctx.step("open reviews");
        pages.product.open_reviews(ctx.session()).await?;

        ctx.step("write review");
        let author = ctx.field("name")?;
        let review = ctx.field("review")?;
        pages
            .product
            .write_review(ctx.session(), &author, &review)
            .await?;

        ctx.step("pick top rating");
        pages.product.click_on_rating(ctx.session()).await?;

        ctx.step("submit review");
        let feedback = pages.product.submit_review(ctx.session()).await?;
        expect_text("review feedback", &ctx.field("successMessage")?, &feedback)?;

        // cart
        ctx.step("add to cart");
        let alert = pages.product.click_on_cart(ctx.session()).await?;
        expect_contains("cart alert", &expect.cart_success, &alert)?;

        ctx.step("cart summary");
        let line_total = unit_price.times(expect.quantity)?;
        let summary = pages.product.open_cart_summary(ctx.session()).await?;
        for part in [
            format!("x {}", expect.quantity),
            line_total.to_string(),
            "View Cart".to_string(),
            "Checkout".to_string(),
        ] {
            expect_contains("cart summary", &part, &summary)?;
        }

        // checkout and authentication
        ctx.step("go to checkout");
        pages.product.click_on_checkout(ctx.session()).await?;

        ctx.step("open login from checkout");
        pages.checkout.click_on_login_link(ctx.session()).await?;

        ctx.step("rejected login");
        let warning = pages.login.failed_login(ctx.session()).await?;
        expect_text("login warning", &ctx.field("warning")?, &warning)?;

        ctx.step("accepted login");
        let url = pages.login.success_login(ctx.session()).await?;
        Assertion::is_true("checkout after login", pages.checkout.matches_url(&url))
            .into_result()?;

        ctx.step("order total");
        let _ = pages
            .checkout
            .validate_checkout_amount(ctx.session(), &line_total)
            .await?;
        Ok(())
    }
}

// =============================================================================
// SUITE
// =============================================================================

/// Which scenarios to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenarioSelection {
    /// Every scenario, in suite order
    #[default]
    All,
    /// [`ComponentNavigation`] only
    ComponentNavigation,
    /// [`PurchaseFlow`] only
    PurchaseFlow,
}

impl FromStr for ScenarioSelection {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            ComponentNavigation::NAME => Ok(Self::ComponentNavigation),
            PurchaseFlow::NAME => Ok(Self::PurchaseFlow),
            other => Err(ProbeError::configuration(format!(
                "unknown scenario '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ScenarioSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::ComponentNavigation => ComponentNavigation::NAME,
            Self::PurchaseFlow => PurchaseFlow::NAME,
        })
    }
}

/// The storefront smoke suite
#[derive(Debug, Clone)]
pub struct StorefrontSuite {
    harness: TestHarness,
    navigation: ComponentNavigation,
    purchase: PurchaseFlow,
}

impl StorefrontSuite {
    /// Build the suite from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Configuration`] for invalid settings or locator
    /// overrides.
    pub fn new(config: SuiteConfig) -> ProbeResult<Self> {
        Ok(Self {
            harness: TestHarness::new(config)?,
            navigation: ComponentNavigation::default(),
            purchase: PurchaseFlow::default(),
        })
    }

    /// Replace the purchase flow expectations
    #[must_use]
    pub fn with_purchase_expectations(mut self, expect: PurchaseExpectations) -> Self {
        self.purchase.expect = expect;
        self
    }

    /// Replace the search term of the navigation scenario
    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.navigation.term = term.into();
        self
    }

    /// Underlying harness
    #[must_use]
    pub const fn harness(&self) -> &TestHarness {
        &self.harness
    }

    /// Scenarios in `selection`, in suite order
    #[must_use]
    pub fn scenarios(&self, selection: ScenarioSelection) -> Vec<&dyn Scenario> {
        let all: [&dyn Scenario; 2] = [&self.navigation, &self.purchase];
        all.into_iter()
            .filter(|s| match selection {
                ScenarioSelection::All => true,
                ScenarioSelection::ComponentNavigation => s.name() == ComponentNavigation::NAME,
                ScenarioSelection::PurchaseFlow => s.name() == PurchaseFlow::NAME,
            })
            .collect()
    }

    /// Run the navigation scenario on `session`
    pub async fn run_component_navigation(&self, session: &mut Session) -> ScenarioReport {
        self.harness.run_scenario(session, &self.navigation).await
    }

    /// Run the purchase flow on `session`
    pub async fn run_purchase_flow(&self, session: &mut Session) -> ScenarioReport {
        self.harness.run_scenario(session, &self.purchase).await
    }

    /// Run every scenario in order on one session
    pub async fn run_all(&self, session: &mut Session) -> SuiteReport {
        self.run_selected(session, ScenarioSelection::All).await
    }

    /// Run the selected scenarios in order on one session
    pub async fn run_selected(
        &self,
        session: &mut Session,
        selection: ScenarioSelection,
    ) -> SuiteReport {
        self.harness.run(session, &self.scenarios(selection)).await
    }

    /// Run the selected scenarios concurrently, one session each
    pub async fn run_isolated(
        &self,
        factory: &dyn SessionFactory,
        selection: ScenarioSelection,
    ) -> SuiteReport {
        self.harness
            .run_isolated(factory, &self.scenarios(selection))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::harness::Phase;
    use crate::mock::{MockSite, MockStorefront, LOGIN_REJECTED, REVIEW_ACCEPTED};
    use crate::result::ErrorKind;
    use std::path::Path;
    use tempfile::TempDir;

    fn fixtures() -> TempDir {
        let dir = TempDir::new().unwrap();
        let body = serde_json::json!({
            "name": "Jordan",
            "review": "Quiet, fast and the battery lasts a full working day.",
            "successMessage": REVIEW_ACCEPTED,
            "warning": LOGIN_REJECTED,
        });
        std::fs::write(dir.path().join("testData.json"), body.to_string()).unwrap();
        dir
    }

    fn suite(fixture_dir: &Path) -> StorefrontSuite {
        StorefrontSuite::new(SuiteConfig {
            fixture_dir: fixture_dir.to_path_buf(),
            timeout_ms: 200,
            poll_interval_ms: 5,
            reviews_settle_ms: 0,
            cart_settle_ms: 0,
            scenario_budget_ms: 10_000,
            ..SuiteConfig::default()
        })
        .unwrap()
    }

    fn session_for(suite: &StorefrontSuite, site: MockSite) -> Session {
        suite
            .harness()
            .session(Box::new(MockStorefront::from_site(site)))
    }

    mod scenario_tests {
        use super::*;

        #[tokio::test]
        async fn test_component_navigation_passes() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let mut session = session_for(&suite, MockSite::demo());
            let report = suite.run_component_navigation(&mut session).await;
            assert!(report.passed(), "{:?}", report.outcome);
            assert_eq!(report.steps_completed, 5);
        }

        #[tokio::test]
        async fn test_purchase_flow_passes() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let mut session = session_for(&suite, MockSite::demo());
            let report = suite.run_purchase_flow(&mut session).await;
            assert!(report.passed(), "{:?}", report.outcome);
            assert_eq!(report.steps_completed, 17);
        }

        #[tokio::test]
        async fn test_purchase_flow_twice_on_one_session() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let mut session = session_for(&suite, MockSite::demo());
            let first = suite.run_purchase_flow(&mut session).await;
            let second = suite.run_purchase_flow(&mut session).await;
            assert_eq!(first.outcome, second.outcome);
            assert!(second.passed());
        }
    }

    mod failure_tests {
        use super::*;

        #[tokio::test]
        async fn test_wrong_review_reply_fails_submit_step() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let site = MockSite::demo().with_review_reply("Thanks!");
            let mut session = session_for(&suite, site);
            let report = suite.run_purchase_flow(&mut session).await;
            let failure = report.failure().unwrap();
            assert_eq!(failure.step, "submit review");
            assert_eq!(failure.kind, ErrorKind::AssertionMismatch);
            assert_eq!(failure.observed.as_deref(), Some("Thanks!"));
        }

        #[tokio::test]
        async fn test_price_change_fails_price_step() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let site = MockSite::demo().with_price("MacBook", Money::usd(59_900));
            let mut session = session_for(&suite, site);
            let report = suite.run_purchase_flow(&mut session).await;
            let failure = report.failure().unwrap();
            assert_eq!(failure.step, "product price");
            assert_eq!(failure.expected.as_deref(), Some("$602.00"));
            assert_eq!(failure.observed.as_deref(), Some("$599.00"));
        }

        #[tokio::test]
        async fn test_shipping_surcharge_fails_order_total() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let site = MockSite::demo().with_checkout_adjustment(Money::usd(500));
            let mut session = session_for(&suite, site);
            let report = suite.run_purchase_flow(&mut session).await;
            let failure = report.failure().unwrap();
            assert_eq!(failure.step, "order total");
            assert_eq!(report.steps_completed, 16);
        }

        #[tokio::test]
        async fn test_missing_product_fails_discovery() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let site = MockSite::demo().without_product("MacBook");
            let mut session = session_for(&suite, site);
            let report = suite.run_purchase_flow(&mut session).await;
            let failure = report.failure().unwrap();
            assert_eq!(failure.kind, ErrorKind::AssertionMismatch);
            assert_eq!(failure.step, "home lists featured products");
            assert_eq!(failure.observed.as_deref(), Some("3"));
        }

        #[tokio::test]
        async fn test_missing_product_is_not_found() {
            let dir = fixtures();
            let suite = suite(dir.path()).with_purchase_expectations(PurchaseExpectations {
                featured_count: 3,
                ..PurchaseExpectations::default()
            });
            let site = MockSite::demo().without_product("MacBook");
            let mut session = session_for(&suite, site);
            let report = suite.run_purchase_flow(&mut session).await;
            let failure = report.failure().unwrap();
            assert_eq!(failure.kind, ErrorKind::NotFound);
            assert_eq!(failure.step, "select MacBook");
            assert_eq!(report.steps_completed, 1);
        }

        #[tokio::test]
        async fn test_fixture_without_warning_fails_at_login_step() {
            let dir = TempDir::new().unwrap();
            std::fs::write(
                dir.path().join("testData.json"),
                serde_json::json!({
                    "name": "Jordan",
                    "review": "Quiet, fast and the battery lasts a full working day.",
                    "successMessage": REVIEW_ACCEPTED,
                })
                .to_string(),
            )
            .unwrap();
            let suite = suite(dir.path());
            let mut session = session_for(&suite, MockSite::demo());
            let report = suite.run_purchase_flow(&mut session).await;
            let failure = report.failure().unwrap();
            assert_eq!(failure.kind, ErrorKind::MissingField);
            assert_eq!(failure.step, "rejected login");
            assert_eq!(failure.phase, Phase::Running);
        }
    }

    mod suite_tests {
        use super::*;

        #[tokio::test]
        async fn test_run_all_sequential() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let mut session = session_for(&suite, MockSite::demo());
            let report = suite.run_all(&mut session).await;
            assert!(report.all_passed());
            let names: Vec<_> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec![ComponentNavigation::NAME, PurchaseFlow::NAME]);
        }

        #[tokio::test]
        async fn test_isolated_sessions_match_sequential() {
            let dir = fixtures();
            let suite = suite(dir.path());
            let mut session = session_for(&suite, MockSite::demo());
            let sequential = suite.run_all(&mut session).await;
            let isolated = suite
                .run_isolated(&MockSite::demo(), ScenarioSelection::All)
                .await;
            let outcomes = |r: &SuiteReport| {
                r.scenarios
                    .iter()
                    .map(|s| (s.name.clone(), s.outcome.clone(), s.steps_completed))
                    .collect::<Vec<_>>()
            };
            assert_eq!(outcomes(&sequential), outcomes(&isolated));
        }

        #[test]
        fn test_selection_round_trips_names() {
            for selection in [
                ScenarioSelection::All,
                ScenarioSelection::ComponentNavigation,
                ScenarioSelection::PurchaseFlow,
            ] {
                assert_eq!(selection.to_string().parse::<ScenarioSelection>().unwrap(), selection);
            }
            assert!("smoke".parse::<ScenarioSelection>().unwrap_err().is_fatal());
        }

        #[test]
        fn test_scenarios_filtered_by_selection() {
            let dir = fixtures();
            let suite = suite(dir.path());
            assert_eq!(suite.scenarios(ScenarioSelection::All).len(), 2);
            let only = suite.scenarios(ScenarioSelection::PurchaseFlow);
            assert_eq!(only.len(), 1);
            assert_eq!(only[0].name(), PurchaseFlow::NAME);
        }
    }
}
