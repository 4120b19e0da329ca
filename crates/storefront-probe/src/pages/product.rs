//! Product detail page: name, price, description, reviews and cart.

use async_trait::async_trait;
use tracing::debug;

use crate::config::SettleTimes;
use crate::locator::{LocatorMap, Selector};
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::Session;

pub(crate) const NAME: &str = "#content h1";
pub(crate) const PRICE: &str = "#content .price-new";
pub(crate) const DESCRIPTION_TAB: &str = "#content > .nav > :nth-child(1) > .nav-link";
pub(crate) const DESCRIPTION_TEXT: &str = "#tab-description > p:first-of-type > b";
pub(crate) const REVIEWS_TAB: &str = "#content > .nav > :nth-child(3) > .nav-link";
pub(crate) const REVIEW_AUTHOR: &str = "#input-author";
pub(crate) const REVIEW_TEXT: &str = "#input-text";
pub(crate) const RATING_MAX: &str = "input[name='rating'][value='5']";
pub(crate) const REVIEW_SUBMIT: &str = "#button-review";
pub(crate) const REVIEW_ALERT: &str = "#form-review .alert-success";
pub(crate) const ADD_TO_CART: &str = "#button-cart";
pub(crate) const CART_ALERT: &str = "#alert .alert-success";
pub(crate) const CART_TOGGLE: &str = ".dropdown.d-grid";
pub(crate) const CART_MENU: &str = ".dropdown-menu.dropdown-menu-end.p-2.show";
pub(crate) const CHECKOUT_LINK: &str = "#top a[title='Checkout']";

/// Operations of the product detail page
#[async_trait]
pub trait ProductRegion: PageObject {
    /// Product title
    async fn get_product_name(&self, session: &Session) -> ProbeResult<String>;

    /// Displayed price text, e.g. `$602.00`
    async fn get_product_price(&self, session: &Session) -> ProbeResult<String>;

    /// Label of the description tab
    async fn get_product_description(&self, session: &Session) -> ProbeResult<String>;

    /// Leading description text, trimmed
    async fn validate_product_description(&self, session: &Session) -> ProbeResult<String>;

    /// Switch to the reviews tab and let it render
    async fn open_reviews(&self, session: &mut Session) -> ProbeResult<()>;

    /// Fill in the review form
    async fn write_review(&self, session: &mut Session, author: &str, text: &str)
        -> ProbeResult<()>;

    /// Pick the highest rating
    async fn click_on_rating(&self, session: &mut Session) -> ProbeResult<()>;

    /// Submit the review and return the feedback shown
    async fn submit_review(&self, session: &mut Session) -> ProbeResult<String>;

    /// Feedback shown after an accepted review
    async fn validate_success_message(&self, session: &Session) -> ProbeResult<String>;

    /// Feedback shown after adding to the cart
    async fn validate_cart_success_message(&self, session: &Session) -> ProbeResult<String>;

    /// Add the product to the cart and return the alert text
    async fn click_on_cart(&self, session: &mut Session) -> ProbeResult<String>;

    /// Open the cart dropdown and return its text
    async fn open_cart_summary(&self, session: &mut Session) -> ProbeResult<String>;

    /// Go to checkout
    async fn click_on_checkout(&self, session: &mut Session) -> ProbeResult<()>;
}

/// The product detail page
#[derive(Debug, Clone)]
pub struct ProductPage {
    locators: LocatorMap,
    settle: SettleTimes,
}

impl ProductPage {
    /// Product page with default locators
    #[must_use]
    pub fn new(settle: SettleTimes) -> Self {
        Self {
            locators: LocatorMap::new("product")
                .with("name", Selector::css(NAME))
                .with("price", Selector::css(PRICE))
                .with("description_tab", Selector::css(DESCRIPTION_TAB))
                .with("description_text", Selector::css(DESCRIPTION_TEXT))
                .with("reviews_tab", Selector::css(REVIEWS_TAB))
                .with("review_author", Selector::css(REVIEW_AUTHOR))
                .with("review_text", Selector::css(REVIEW_TEXT))
                .with("rating_max", Selector::css(RATING_MAX))
                .with("review_submit", Selector::css(REVIEW_SUBMIT))
                .with("review_alert", Selector::css(REVIEW_ALERT))
                .with("add_to_cart", Selector::css(ADD_TO_CART))
                .with("cart_alert", Selector::css(CART_ALERT))
                .with("cart_toggle", Selector::css(CART_TOGGLE))
                .with("cart_menu", Selector::css(CART_MENU))
                .with("checkout_link", Selector::css(CHECKOUT_LINK)),
            settle,
        }
    }

    /// Settle pauses used by this page
    #[must_use]
    pub const fn settle_times(&self) -> SettleTimes {
        self.settle
    }
}

impl PageObject for ProductPage {
    fn url_pattern(&self) -> &str {
        "route=product/product"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }

    fn locators_mut(&mut self) -> &mut LocatorMap {
        &mut self.locators
    }
}

#[async_trait]
impl ProductRegion for ProductPage {
    async fn get_product_name(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("name")?).await
    }

    async fn get_product_price(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("price")?).await
    }

    async fn get_product_description(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("description_tab")?).await
    }

    async fn validate_product_description(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("description_text")?).await
    }

    async fn open_reviews(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("reviews_tab")?).await?;
        session.settle(self.settle.reviews).await;
        Ok(())
    }

    async fn write_review(
        &self,
        session: &mut Session,
        author: &str,
        text: &str,
    ) -> ProbeResult<()> {
        debug!(author, chars = text.chars().count(), "write review");
        session.type_into(self.locator("review_author")?, author).await?;
        session.type_into(self.locator("review_text")?, text).await
    }

    async fn click_on_rating(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("rating_max")?).await
    }

    async fn submit_review(&self, session: &mut Session) -> ProbeResult<String> {
        session.click(self.locator("review_submit")?).await?;
        self.validate_success_message(session).await
    }

    async fn validate_success_message(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("review_alert")?).await
    }

    async fn validate_cart_success_message(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("cart_alert")?).await
    }

    async fn click_on_cart(&self, session: &mut Session) -> ProbeResult<String> {
        session.click(self.locator("add_to_cart")?).await?;
        self.validate_cart_success_message(session).await
    }

    async fn open_cart_summary(&self, session: &mut Session) -> ProbeResult<String> {
        session.settle(self.settle.cart).await;
        session.click(self.locator("cart_toggle")?).await?;
        session.read_text(self.locator("cart_menu")?).await
    }

    async fn click_on_checkout(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("checkout_link")?).await?;
        let _ = session.wait_for_url("checkout/checkout").await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::{MockSite, REVIEW_ACCEPTED};
    use crate::pages::test_support::session_on;
    use crate::pages::{HomePage, HomeRegion};
    use crate::result::ProbeError;
    use std::time::Duration;

    const REVIEW: &str = "Quiet, fast and the battery lasts all day long.";

    fn page() -> ProductPage {
        ProductPage::new(SettleTimes {
            reviews: Duration::ZERO,
            cart: Duration::ZERO,
        })
    }

    async fn on_macbook(site: MockSite) -> Session {
        let mut session = session_on(site).await;
        HomePage::new()
            .select_products(&mut session, "MacBook")
            .await
            .unwrap();
        session
    }

    mod details_tests {
        use super::*;

        #[tokio::test]
        async fn test_reference_product_details() {
            let product = page();
            let session = on_macbook(MockSite::demo()).await;
            assert_eq!(product.get_product_name(&session).await.unwrap(), "MacBook");
            assert_eq!(product.get_product_price(&session).await.unwrap(), "$602.00");
            assert_eq!(
                product.get_product_description(&session).await.unwrap(),
                "Description"
            );
            assert_eq!(
                product.validate_product_description(&session).await.unwrap(),
                "Intel Core 2 Duo processor"
            );
        }

        #[tokio::test]
        async fn test_description_hidden_on_reviews_tab() {
            let product = page();
            let mut session = on_macbook(MockSite::demo()).await;
            product.open_reviews(&mut session).await.unwrap();
            let err = product
                .validate_product_description(&session)
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }
    }

    mod review_tests {
        use super::*;

        #[tokio::test]
        async fn test_review_accepted() {
            let product = page();
            let mut session = on_macbook(MockSite::demo()).await;
            product.open_reviews(&mut session).await.unwrap();
            product
                .write_review(&mut session, "Jordan", REVIEW)
                .await
                .unwrap();
            product.click_on_rating(&mut session).await.unwrap();
            let feedback = product.submit_review(&mut session).await.unwrap();
            assert_eq!(feedback, REVIEW_ACCEPTED);
        }

        #[tokio::test]
        async fn test_review_form_needs_reviews_tab() {
            let product = page();
            let mut session = on_macbook(MockSite::demo()).await;
            assert!(product
                .write_review(&mut session, "Jordan", REVIEW)
                .await
                .is_err());
        }

        #[tokio::test]
        async fn test_review_without_rating_gets_no_success() {
            let product = page();
            let mut session = on_macbook(MockSite::demo()).await;
            product.open_reviews(&mut session).await.unwrap();
            product
                .write_review(&mut session, "Jordan", REVIEW)
                .await
                .unwrap();
            let err = product.submit_review(&mut session).await.unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }
    }

    mod cart_tests {
        use super::*;

        #[tokio::test]
        async fn test_add_to_cart_and_summary() {
            let product = page();
            let mut session = on_macbook(MockSite::demo()).await;
            let alert = product.click_on_cart(&mut session).await.unwrap();
            assert!(alert.contains("Success"));
            assert!(alert.contains("MacBook"));

            let summary = product.open_cart_summary(&mut session).await.unwrap();
            for part in ["x 1", "$602.00", "View Cart", "Checkout"] {
                assert!(summary.contains(part), "{summary:?} lacks {part:?}");
            }

            product.click_on_checkout(&mut session).await.unwrap();
            assert!(session
                .current_url()
                .await
                .unwrap()
                .contains("checkout/checkout"));
        }

        #[tokio::test]
        async fn test_checkout_with_empty_cart_stays_off_checkout() {
            let product = page();
            let mut session = on_macbook(MockSite::demo()).await;
            let err = product.click_on_checkout(&mut session).await.unwrap_err();
            assert!(matches!(err, ProbeError::Timeout { .. }));
        }
    }
}
