//! Login page with fixed credential pairs.

use async_trait::async_trait;
use tracing::debug;

use crate::config::Credentials;
use crate::locator::{LocatorMap, Selector};
use crate::page_object::PageObject;
use crate::pages::checkout;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;

pub(crate) const EMAIL: &str = "#input-email";
pub(crate) const PASSWORD: &str = "#input-password";
pub(crate) const SUBMIT: &str = "#form-login button[type='submit']";
pub(crate) const WARNING: &str = "#alert .alert-danger";

/// Operations of the login page
#[async_trait]
pub trait LoginRegion: PageObject {
    /// Submit the invalid pair and return the warning shown
    async fn failed_login(&self, session: &mut Session) -> ProbeResult<String>;

    /// Submit the valid pair, wait to be sent back to checkout and check that
    /// checkout no longer offers the returning-customer login
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] when checkout still treats
    /// the session as a guest.
    async fn success_login(&self, session: &mut Session) -> ProbeResult<String>;

    /// Inline warning, trimmed
    async fn get_warning_message(&self, session: &Session) -> ProbeResult<String>;
}

/// The login page
#[derive(Debug, Clone)]
pub struct LoginPage {
    locators: LocatorMap,
    valid: Credentials,
    invalid: Credentials,
}

impl LoginPage {
    /// Login page with default locators and the given credential pairs
    #[must_use]
    pub fn new(valid: Credentials, invalid: Credentials) -> Self {
        Self {
            locators: LocatorMap::new("login")
                .with("email", Selector::css(EMAIL))
                .with("password", Selector::css(PASSWORD))
                .with("submit", Selector::css(SUBMIT))
                .with("warning", Selector::css(WARNING))
                .with("checkout_ready", Selector::css(checkout::CONFIRM))
                .with("guest_prompt", Selector::css(checkout::LOGIN_LINK)),
            valid,
            invalid,
        }
    }

    async fn submit(&self, session: &mut Session, credentials: &Credentials) -> ProbeResult<()> {
        debug!(email = %credentials.email, "submit login");
        session
            .type_into(self.locator("email")?, &credentials.email)
            .await?;
        session
            .type_into(self.locator("password")?, &credentials.password)
            .await?;
        session.click(self.locator("submit")?).await
    }
}

impl PageObject for LoginPage {
    fn url_pattern(&self) -> &str {
        "route=account/login"
    }

    fn locators(&self) -> &LocatorMap {
        &self.locators
    }

    fn locators_mut(&mut self) -> &mut LocatorMap {
        &mut self.locators
    }
}

#[async_trait]
impl LoginRegion for LoginPage {
    async fn failed_login(&self, session: &mut Session) -> ProbeResult<String> {
        self.submit(session, &self.invalid).await?;
        self.get_warning_message(session).await
    }

    async fn success_login(&self, session: &mut Session) -> ProbeResult<String> {
        self.submit(session, &self.valid).await?;
        let url = session.wait_for_url("checkout/checkout").await?;
        let _ = session.wait_for(self.locator("checkout_ready")?).await?;
        let prompts = session.find_all(self.locator("guest_prompt")?).await?;
        if prompts.iter().any(|el| el.visible) {
            return Err(ProbeError::mismatch(
                "session after login",
                "authenticated checkout",
                "checkout still offers the returning-customer login",
            ));
        }
        debug!(email = %self.valid.email, "logged in");
        Ok(url)
    }

    async fn get_warning_message(&self, session: &Session) -> ProbeResult<String> {
        session.read_text(self.locator("warning")?).await
    }
}
