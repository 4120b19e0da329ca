//! Browser session: the one mutable resource a scenario holds.
//!
//! A [`Session`] wraps a driver with the wait policy. Page objects borrow it
//! mutably for every operation, so only one scenario can drive it at a time.

use std::time::Duration;
use tracing::debug;

use crate::driver::{ElementHandle, StorageSnapshot, StorefrontDriver};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{settle, WaitOptions};

/// Browser session used by page objects
#[derive(Debug)]
pub struct Session {
    driver: Box<dyn StorefrontDriver>,
    wait: WaitOptions,
}

impl Session {
    /// Create session with existing driver
    #[must_use]
    pub fn new(driver: Box<dyn StorefrontDriver>, wait: WaitOptions) -> Self {
        Self { driver, wait }
    }

    /// Wait policy applied to condition waits
    #[must_use]
    pub const fn wait_options(&self) -> &WaitOptions {
        &self.wait
    }

    fn options_for(&self, locator: &Locator) -> WaitOptions {
        locator
            .options()
            .timeout
            .map_or(self.wait, |timeout| self.wait.with_timeout(timeout))
    }

    /// Clear all persisted state and report what is left
    pub async fn clear_storage(&mut self) -> ProbeResult<StorageSnapshot> {
        self.driver.clear_storage().await?;
        self.driver.storage_snapshot().await
    }

    /// Navigate to URL
    pub async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        debug!(url, "navigate");
        self.driver.navigate(url).await
    }

    /// Get current URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Elements currently matching the locator, without waiting
    pub async fn find_all(&self, locator: &Locator) -> ProbeResult<Vec<ElementHandle>> {
        self.driver.query_all(locator.selector()).await
    }

    /// Wait until at least one element matches and satisfies visibility
    pub async fn wait_for(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        let need_visible = locator.options().visible;
        let mut deadline = self.options_for(locator).deadline(locator.to_string());
        loop {
            let found = self
                .driver
                .query_all(locator.selector())
                .await?
                .into_iter()
                .find(|el| el.visible || !need_visible);
            if let Some(element) = found {
                return Ok(element);
            }
            deadline.tick().await?;
        }
    }

    /// Wait until a matching element's trimmed text satisfies `accept`
    pub async fn wait_for_text<F>(&self, locator: &Locator, accept: F) -> ProbeResult<String>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let mut deadline = self.options_for(locator).deadline(locator.to_string());
        loop {
            let found = self
                .driver
                .query_all(locator.selector())
                .await?
                .into_iter()
                .find(|el| el.visible && accept(el.trimmed_text()));
            if let Some(element) = found {
                return Ok(element.trimmed_text().to_string());
            }
            deadline.tick().await?;
        }
    }

    /// Wait until the current URL contains `fragment`
    pub async fn wait_for_url(&self, fragment: &str) -> ProbeResult<String> {
        let mut deadline = self.wait.deadline(format!("URL containing {fragment:?}"));
        loop {
            let url = self.driver.current_url().await?;
            if url.contains(fragment) {
                return Ok(url);
            }
            deadline.tick().await?;
        }
    }

    /// Wait for the element, then read its trimmed text
    pub async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.wait_for(locator).await?.trimmed_text().to_string())
    }

    /// Wait for the element, then click it
    pub async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        let element = self.wait_for(locator).await?;
        self.click_element(locator, &element).await
    }

    /// Click a specific element previously returned for `locator`
    pub async fn click_element(
        &mut self,
        locator: &Locator,
        element: &ElementHandle,
    ) -> ProbeResult<()> {
        debug!(locator = %locator, index = element.index, "click");
        self.driver.click(locator.selector(), element.index).await
    }

    /// Wait for the input, then replace its value with `text`
    pub async fn type_into(&mut self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let element = self.wait_for(locator).await?;
        debug!(locator = %locator, "type");
        self.driver
            .type_text(locator.selector(), element.index, text)
            .await
    }

    /// Fixed pause where no readiness signal exists
    pub async fn settle(&self, duration: Duration) {
        debug!(ms = duration.as_millis() as u64, "settle");
        settle(duration).await;
    }

    /// Close the underlying browser
    pub async fn close(mut self) -> ProbeResult<()> {
        self.driver.close().await
    }
}

/// Lazy, finite sequence over the elements matching a locator.
///
/// Each [`next`](Self::next) re-queries the live DOM. Once the page URL
/// differs from the one the sequence was created on, the sequence is stale
/// and cannot be restarted.
#[derive(Debug, Clone)]
pub struct ElementSequence {
    locator: Locator,
    origin_url: String,
    position: usize,
}

impl ElementSequence {
    /// Start a sequence on the session's current page
    pub async fn start(session: &Session, locator: Locator) -> ProbeResult<Self> {
        let origin_url = session.current_url().await?;
        Ok(Self {
            locator,
            origin_url,
            position: 0,
        })
    }

    /// Next element, or `None` once all current matches were yielded
    pub async fn next(&mut self, session: &Session) -> ProbeResult<Option<ElementHandle>> {
        let url = session.current_url().await?;
        if url != self.origin_url {
            return Err(ProbeError::StaleSequence {
                what: self.locator.to_string(),
                from: self.origin_url.clone(),
                to: url,
            });
        }
        let element = session
            .find_all(&self.locator)
            .await?
            .into_iter()
            .nth(self.position);
        if element.is_some() {
            self.position += 1;
        }
        Ok(element)
    }

    /// Drain the remaining elements into a vector
    pub async fn collect(mut self, session: &Session) -> ProbeResult<Vec<ElementHandle>> {
        let mut out = Vec::new();
        while let Some(element) = self.next(session).await? {
            out.push(element);
        }
        Ok(out)
    }

    /// Locator the sequence iterates
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }
}
