//! Landing page with the featured product listing.

use async_trait::async_trait;
use tracing::debug;

use crate::driver::ElementHandle;
use crate::locator::{LocatorMap, Selector};
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;

pub(crate) const PRODUCT_CARDS: &str = "#content .product-thumb";
pub(crate) const PRODUCT_TITLES: &str = "#content .product-thumb h4 a";

/// Operations of the landing page
#[async_trait]
pub trait HomeRegion: PageObject {
    /// The featured product listing, in page order
    ///
    /// A listing that stays empty for the whole wait gives an empty list.
    async fn display_products(&self, session: &Session) -> ProbeResult<Vec<ElementHandle>>;

    /// Open the first product whose title equals, or else contains, `name`
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::NotFound`] when no title matches.
    async fn select_products(&self, session: &mut Session, name: &str) -> ProbeResult<()>;
}

/// The landing page
#[derive(Debug, Clone)]
pub struct HomePage {
    locators: LocatorMap,
}

impl HomePage {
    /// Landing page with default locators
    #[must_use]
    pub fn new() -> Self {
        Self {
            locators: LocatorMap::new("home")
                .with("products", Selector::css(PRODUCT_CARDS))
                .with("product_titles", Selector::css(PRODUCT_TITLES)),
        }
    }
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl PageObject for HomePage {
    fn url_pattern(&self) -> &str {
        "route=common/home"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }

    fn locators_mut(&mut self) -> &mut LocatorMap {
        &mut self.locators
    }

    // the bare entry URL is the landing page too
    fn matches_url(&self, url: &str) -> bool {
        !url.contains("route=") || url.contains(self.url_pattern())
    }
}

/// Index of the element to open: exact title first, then substring
fn pick_product(titles: &[ElementHandle], name: &str) -> Option<usize> {
    titles
        .iter()
        .position(|t| t.trimmed_text() == name)
        .or_else(|| titles.iter().position(|t| t.text.contains(name)))
}

#[async_trait]
impl HomeRegion for HomePage {
    async fn display_products(&self, session: &Session) -> ProbeResult<Vec<ElementHandle>> {
        let products = self.locator("products")?;
        match session.wait_for(products).await {
            Ok(_) => session.find_all(products).await,
            Err(ProbeError::Timeout { .. }) => {
                debug!("no products listed");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn select_products(&self, session: &mut Session, name: &str) -> ProbeResult<()> {
        let titles = self.locator("product_titles")?;
        let _ = session.wait_for(titles).await?;
        let listed = session.find_all(titles).await?;
        let index = pick_product(&listed, name)
            .ok_or_else(|| ProbeError::not_found(format!("product '{name}' on the home page")))?;
        debug!(name, index, "select product");
        session.click_element(titles, &listed[index]).await?;
        let _ = session.wait_for_url("product_id=").await?;
        Ok(())
    }
}
