//! Checkout page.

use async_trait::async_trait;

use crate::assertion::expect_amount;
use crate::locator::{LocatorMap, Selector};
use crate::money::Money;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::Session;

pub(crate) const CONFIRM: &str = "#checkout-confirm";
pub(crate) const LOGIN_LINK: &str = "#content a[href*='account/login']";
pub(crate) const ORDER_TOTAL: &str = "#checkout-confirm tfoot tr:last-child td:last-child";

/// Operations of the checkout page
#[async_trait]
pub trait CheckoutRegion: PageObject {
    /// Open the login page from the returning-customer prompt
    async fn click_on_login_link(&self, session: &mut Session) -> ProbeResult<()>;

    /// Compare the displayed order total with `expected`, returning the total
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProbeError::AssertionMismatch`] when the amounts differ
    /// or the total is not a currency amount.
    async fn validate_checkout_amount(
        &self,
        session: &Session,
        expected: &Money,
    ) -> ProbeResult<Money>;
}

/// The checkout page
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    locators: LocatorMap,
}

impl CheckoutPage {
    /// Checkout page with default locators
    #[must_use]
    pub fn new() -> Self {
        Self {
            locators: LocatorMap::new("checkout")
                .with("confirm", Selector::css(CONFIRM))
                .with("login_link", Selector::css(LOGIN_LINK))
                .with("order_total", Selector::css(ORDER_TOTAL)),
        }
    }
}

impl Default for CheckoutPage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject for CheckoutPage {
    fn url_pattern(&self) -> &str {
        "route=checkout/checkout"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }

    fn locators_mut(&mut self) -> &mut LocatorMap {
        &mut self.locators
    }
}

#[async_trait]
impl CheckoutRegion for CheckoutPage {
    async fn click_on_login_link(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("login_link")?).await?;
        let _ = session.wait_for_url("account/login").await?;
        Ok(())
    }

    async fn validate_checkout_amount(
        &self,
        session: &Session,
        expected: &Money,
    ) -> ProbeResult<Money> {
        let _ = session.wait_for_url(self.url_pattern()).await?;
        let _ = session.wait_for(self.locator("confirm")?).await?;
        let shown = session.read_text(self.locator("order_total")?).await?;
        expect_amount("order total", expected, &shown)?;
        shown.parse()
    }
}
