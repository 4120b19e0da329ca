//! Header component: search box, account menu and logo.

use async_trait::async_trait;
use tracing::debug;

use crate::locator::{LocatorMap, Selector};
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::session::{ElementSequence, Session};

pub(crate) const SEARCH_INPUT: &str = "#search input[name='search']";
pub(crate) const SEARCH_BUTTON: &str = "#search button";
pub(crate) const RESULTS_HEADING: &str = "#content h1";
pub(crate) const RESULT_TITLES: &str = "#content .product-thumb h4 a";
pub(crate) const ACCOUNT_TOGGLES: &str = "#top .dropdown-toggle";
pub(crate) const ACCOUNT_MENU_LINKS: &str = "#top .dropdown-menu a";
pub(crate) const LOGO: &str = "#logo a";

/// Where a search landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// Term that was searched
    pub term: String,
    /// URL of the results page
    pub url: String,
}

/// Operations of the header component
#[async_trait]
pub trait NavbarRegion: PageObject {
    /// Enter `term` in the search box, trigger the search and wait for results
    async fn search_product(&self, session: &mut Session, term: &str)
        -> ProbeResult<SearchResults>;

    /// Wait for the results heading naming `term` and return the result titles
    ///
    /// No matches give an empty sequence.
    async fn validate_all_search_results(
        &self,
        session: &Session,
        term: &str,
    ) -> ProbeResult<ElementSequence>;

    /// Open the account menu
    async fn click_on_my_account(&self, session: &mut Session) -> ProbeResult<()>;

    /// Follow the login entry of the account menu
    async fn click_on_login(&self, session: &mut Session) -> ProbeResult<()>;

    /// Return to the landing page
    async fn click_on_logo(&self, session: &mut Session) -> ProbeResult<()>;
}

/// The storefront header
#[derive(Debug, Clone)]
pub struct Navbar {
    locators: LocatorMap,
}

impl Navbar {
    /// Header with default locators
    #[must_use]
    pub fn new() -> Self {
        Self {
            locators: LocatorMap::new("navbar")
                .with("search_input", Selector::css(SEARCH_INPUT))
                .with("search_button", Selector::css(SEARCH_BUTTON))
                .with("results_heading", Selector::css(RESULTS_HEADING))
                .with("result_titles", Selector::css(RESULT_TITLES))
                .with("my_account", Selector::contains(ACCOUNT_TOGGLES, "My Account"))
                .with("login_link", Selector::contains(ACCOUNT_MENU_LINKS, "Login"))
                .with("logo", Selector::css(LOGO)),
        }
    }
}

impl Default for Navbar {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject for Navbar {
    fn url_pattern(&self) -> &str {
        ""
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }

    fn locators_mut(&mut self) -> &mut LocatorMap {
        &mut self.locators
    }
}

#[async_trait]
impl NavbarRegion for Navbar {
    async fn search_product(
        &self,
        session: &mut Session,
        term: &str,
    ) -> ProbeResult<SearchResults> {
        debug!(term, "search");
        session.type_into(self.locator("search_input")?, term).await?;
        session.click(self.locator("search_button")?).await?;
        let url = session.wait_for_url("search=").await?;
        Ok(SearchResults {
            term: term.to_string(),
            url,
        })
    }

    async fn validate_all_search_results(
        &self,
        session: &Session,
        term: &str,
    ) -> ProbeResult<ElementSequence> {
        let heading = self.locator("results_heading")?;
        let _ = session.wait_for_text(heading, |text| text.contains(term)).await?;
        ElementSequence::start(session, self.locator("result_titles")?.clone()).await
    }

    async fn click_on_my_account(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("my_account")?).await
    }

    async fn click_on_login(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("login_link")?).await?;
        let _ = session.wait_for_url("account/login").await?;
        Ok(())
    }

    async fn click_on_logo(&self, session: &mut Session) -> ProbeResult<()> {
        session.click(self.locator("logo")?).await
    }
}
