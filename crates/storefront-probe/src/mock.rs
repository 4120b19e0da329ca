//! In-memory storefront driver for unit tests and offline runs.
//!
//! [`MockStorefront`] simulates the reference OpenCart demo shop closely
//! enough for every page object to run unchanged: catalog, search, product
//! tabs, review form, cart dropdown, login and checkout. It understands the
//! default selectors of the page objects and nothing else.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::config::{DEFAULT_INVALID_EMAIL, DEFAULT_VALID_EMAIL, DEFAULT_VALID_PASSWORD};
use crate::driver::{ElementHandle, SessionFactory, StorageSnapshot, StorefrontDriver};
use crate::locator::Selector;
use crate::money::Money;
use crate::pages::{checkout, home, login, navbar, product};
use crate::result::{ProbeError, ProbeResult};

/// Reply shown after an accepted review
pub const REVIEW_ACCEPTED: &str =
    "Thank you for your review. It has been submitted to the webmaster for approval.";

/// Warning shown after a rejected login
pub const LOGIN_REJECTED: &str = "Warning: No match for E-Mail Address and/or Password.";

/// A product in the simulated catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProduct {
    /// Product id used in URLs
    pub id: u32,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// First bold line of the description tab
    pub description: String,
    /// Whether the product is listed on the home page
    pub featured: bool,
}

impl MockProduct {
    fn new(id: u32, name: &str, price_minor: i64, description: &str, featured: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            price: Money::usd(price_minor),
            description: description.to_string(),
            featured,
        }
    }
}

/// Static site data: catalog, accounts and canned replies
#[derive(Debug, Clone)]
pub struct MockSite {
    catalog: Vec<MockProduct>,
    accounts: Vec<(String, String)>,
    review_reply: String,
    checkout_adjustment: Money,
}

impl MockSite {
    /// The reference demo shop
    #[must_use]
    pub fn demo() -> Self {
        Self {
            catalog: vec![
                MockProduct::new(43, "MacBook", 60_200, "Intel Core 2 Duo processor", true),
                MockProduct::new(40, "iPhone", 12_320, "iPhone is a revolutionary new mobile phone", true),
                MockProduct::new(42, "Apple Cinema 30\"", 12_200, "The 30-inch Apple Cinema HD Display", true),
                MockProduct::new(30, "Canon EOS 5D", 9_800, "Canon's press material for the EOS 5D", true),
                MockProduct::new(44, "MacBook Air", 120_200, "MacBook Air is ultrathin", false),
                MockProduct::new(45, "MacBook Pro", 200_000, "Latest Intel mobile architecture", false),
                MockProduct::new(47, "HP LP3065", 12_200, "Stop staring at a small screen", false),
            ],
            accounts: vec![(
                DEFAULT_VALID_EMAIL.to_string(),
                DEFAULT_VALID_PASSWORD.to_string(),
            )],
            review_reply: REVIEW_ACCEPTED.to_string(),
            checkout_adjustment: Money::usd(0),
        }
    }

    /// Replace the reply shown for accepted reviews
    #[must_use]
    pub fn with_review_reply(mut self, reply: impl Into<String>) -> Self {
        self.review_reply = reply.into();
        self
    }

    /// Replace the accepted accounts
    #[must_use]
    pub fn with_account(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.accounts = vec![(email.into(), password.into())];
        self
    }

    /// Remove a product from the catalog
    #[must_use]
    pub fn without_product(mut self, name: &str) -> Self {
        self.catalog.retain(|p| p.name != name);
        self
    }

    /// Change the unit price of a product
    #[must_use]
    pub fn with_price(mut self, name: &str, price: Money) -> Self {
        if let Some(p) = self.catalog.iter_mut().find(|p| p.name == name) {
            p.price = price;
        }
        self
    }

    /// Add an amount to the order total shown at checkout (e.g. shipping)
    #[must_use]
    pub fn with_checkout_adjustment(mut self, amount: Money) -> Self {
        self.checkout_adjustment = amount;
        self
    }

    /// Catalog products
    #[must_use]
    pub fn catalog(&self) -> &[MockProduct] {
        &self.catalog
    }

    fn product(&self, id: u32) -> Option<&MockProduct> {
        self.catalog.iter().find(|p| p.id == id)
    }

    fn featured(&self) -> Vec<&MockProduct> {
        self.catalog.iter().filter(|p| p.featured).collect()
    }

    fn search(&self, term: &str) -> Vec<&MockProduct> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.catalog
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }
}

#[async_trait]
impl SessionFactory for MockSite {
    async fn open(&self) -> ProbeResult<Box<dyn StorefrontDriver>> {
        Ok(Box::new(MockStorefront::from_site(self.clone())))
    }
}

/// Shared record of driver calls, readable after the driver moved into a session
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: String) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(entry);
        }
    }

    /// Copy of the calls so far
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.entries().iter().any(|c| c.starts_with(prefix))
    }

    /// Position of the first call starting with `prefix`
    #[must_use]
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().position(|c| c.starts_with(prefix))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MockPage {
    Blank,
    Home,
    Search(String),
    Product(u32),
    Login { back_to_checkout: bool },
    Account,
    Cart,
    Checkout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ProductTab {
    #[default]
    Description,
    Reviews,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alert {
    text: String,
    success: bool,
}

/// Everything that lives in the browser for one session
#[derive(Debug, Clone)]
struct MockState {
    page: MockPage,
    account_menu_open: bool,
    cart_menu_open: bool,
    tab: ProductTab,
    inputs: BTreeMap<&'static str, String>,
    rating: Option<u8>,
    review_alert: Option<Alert>,
    page_alert: Option<Alert>,
    cart: Vec<(u32, u32)>,
    authenticated: bool,
    cookies: BTreeMap<String, String>,
    local_storage: BTreeMap<String, String>,
    session_storage: BTreeMap<String, String>,
    closed: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            page: MockPage::Blank,
            account_menu_open: false,
            cart_menu_open: false,
            tab: ProductTab::default(),
            inputs: BTreeMap::new(),
            rating: None,
            review_alert: None,
            page_alert: None,
            cart: Vec::new(),
            authenticated: false,
            cookies: BTreeMap::new(),
            local_storage: BTreeMap::new(),
            session_storage: BTreeMap::new(),
            closed: false,
        }
    }
}

/// Elements the simulation knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    SearchInput,
    SearchButton,
    Heading,
    ProductTitles,
    ProductCards,
    AccountToggles,
    AccountMenuLinks,
    Logo,
    Price,
    DescriptionTab,
    DescriptionText,
    ReviewsTab,
    ReviewAuthor,
    ReviewText,
    RatingMax,
    ReviewSubmit,
    ReviewAlert,
    AddToCart,
    CartAlert,
    CartToggle,
    CartMenu,
    CheckoutLink,
    CheckoutConfirm,
    CheckoutLoginLink,
    OrderTotal,
    LoginEmail,
    LoginPassword,
    LoginSubmit,
    LoginWarning,
}

/// First entry wins when two page objects share a selector
const TARGETS: &[(&str, Target)] = &[
    (navbar::SEARCH_INPUT, Target::SearchInput),
    (navbar::SEARCH_BUTTON, Target::SearchButton),
    (navbar::RESULTS_HEADING, Target::Heading),
    (navbar::RESULT_TITLES, Target::ProductTitles),
    (navbar::ACCOUNT_TOGGLES, Target::AccountToggles),
    (navbar::ACCOUNT_MENU_LINKS, Target::AccountMenuLinks),
    (navbar::LOGO, Target::Logo),
    (home::PRODUCT_CARDS, Target::ProductCards),
    (home::PRODUCT_TITLES, Target::ProductTitles),
    (product::NAME, Target::Heading),
    (product::PRICE, Target::Price),
    (product::DESCRIPTION_TAB, Target::DescriptionTab),
    (product::DESCRIPTION_TEXT, Target::DescriptionText),
    (product::REVIEWS_TAB, Target::ReviewsTab),
    (product::REVIEW_AUTHOR, Target::ReviewAuthor),
    (product::REVIEW_TEXT, Target::ReviewText),
    (product::RATING_MAX, Target::RatingMax),
    (product::REVIEW_SUBMIT, Target::ReviewSubmit),
    (product::REVIEW_ALERT, Target::ReviewAlert),
    (product::ADD_TO_CART, Target::AddToCart),
    (product::CART_ALERT, Target::CartAlert),
    (product::CART_TOGGLE, Target::CartToggle),
    (product::CART_MENU, Target::CartMenu),
    (product::CHECKOUT_LINK, Target::CheckoutLink),
    (checkout::CONFIRM, Target::CheckoutConfirm),
    (checkout::LOGIN_LINK, Target::CheckoutLoginLink),
    (checkout::ORDER_TOTAL, Target::OrderTotal),
    (login::EMAIL, Target::LoginEmail),
    (login::PASSWORD, Target::LoginPassword),
    (login::SUBMIT, Target::LoginSubmit),
    (login::WARNING, Target::LoginWarning),
];

fn classify(css: &str) -> Option<(&'static str, Target)> {
    TARGETS
        .iter()
        .find(|(selector, _)| *selector == css)
        .map(|(selector, target)| (*selector, *target))
}

/// Simulated storefront implementing [`StorefrontDriver`]
#[derive(Debug)]
pub struct MockStorefront {
    site: MockSite,
    state: MockState,
    log: CallLog,
}

impl MockStorefront {
    /// Entry URL of the simulated shop
    pub const BASE_URL: &'static str = "https://demo.codenbox.com/";

    /// Driver for the reference demo shop
    #[must_use]
    pub fn demo() -> Self {
        Self::from_site(MockSite::demo())
    }

    /// Driver for a customized site
    #[must_use]
    pub fn from_site(site: MockSite) -> Self {
        Self {
            site,
            state: MockState::default(),
            log: CallLog::default(),
        }
    }

    /// Handle on the call history that survives moving the driver
    #[must_use]
    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    /// Simulate state left behind by an earlier visitor
    #[must_use]
    pub fn with_leftover_state(mut self) -> Self {
        let _ = self.state.cookies.insert("OCSESSID".into(), "stale".into());
        let _ = self.state.local_storage.insert("compare".into(), "[43]".into());
        let _ = self.state.session_storage.insert("draft".into(), "review".into());
        self.state.cart.push((43, 3));
        self.state.authenticated = true;
        self
    }

    fn url_for(page: &MockPage) -> String {
        let route = match page {
            MockPage::Blank => return "about:blank".to_string(),
            MockPage::Home => return Self::BASE_URL.to_string(),
            MockPage::Search(term) => {
                format!("product/search&language=en-gb&search={}", term.replace(' ', "%20"))
            }
            MockPage::Product(id) => format!("product/product&language=en-gb&product_id={id}"),
            MockPage::Login { .. } => "account/login&language=en-gb".to_string(),
            MockPage::Account => "account/account&language=en-gb".to_string(),
            MockPage::Cart => "checkout/cart&language=en-gb".to_string(),
            MockPage::Checkout => "checkout/checkout&language=en-gb".to_string(),
        };
        format!("{}index.php?route={route}", Self::BASE_URL)
    }

    fn page_for_url(&self, url: &str) -> ProbeResult<MockPage> {
        let Some(rest) = url.strip_prefix(Self::BASE_URL) else {
            return Err(ProbeError::driver(format!(
                "net::ERR_NAME_NOT_RESOLVED at {url}"
            )));
        };
        let param = |key: &str| {
            rest.split(['?', '&'])
                .find_map(|pair| pair.strip_prefix(key).and_then(|v| v.strip_prefix('=')))
                .map(str::to_string)
        };
        let page = match param("route").as_deref() {
            None | Some("common/home") => MockPage::Home,
            Some("product/search") => {
                MockPage::Search(param("search").unwrap_or_default().replace("%20", " "))
            }
            Some("product/product") => param("product_id")
                .and_then(|id| id.parse().ok())
                .filter(|id| self.site.product(*id).is_some())
                .map_or(MockPage::Home, MockPage::Product),
            Some("account/login") => MockPage::Login {
                back_to_checkout: false,
            },
            Some("account/account") if self.state.authenticated => MockPage::Account,
            Some("account/account") => MockPage::Login {
                back_to_checkout: false,
            },
            Some("checkout/cart") => MockPage::Cart,
            Some("checkout/checkout") => MockPage::Checkout,
            Some(other) => {
                return Err(ProbeError::driver(format!("unknown route {other}")));
            }
        };
        Ok(page)
    }

    fn goto(&mut self, page: MockPage) {
        let state = &mut self.state;
        state.account_menu_open = false;
        state.cart_menu_open = false;
        state.tab = ProductTab::default();
        state.rating = None;
        state.review_alert = None;
        state.page_alert = None;
        state.inputs.clear();
        if let MockPage::Search(term) = &page {
            let _ = state.inputs.insert(navbar::SEARCH_INPUT, term.clone());
        }
        state.page = page;
        let _ = state
            .cookies
            .entry("OCSESSID".into())
            .or_insert_with(|| "a1b2c3d4e5".into());
        let _ = state
            .local_storage
            .insert("language".into(), "en-gb".into());
    }

    fn cart_total(&self) -> ProbeResult<Money> {
        self.state
            .cart
            .iter()
            .filter_map(|(id, qty)| self.site.product(*id).map(|p| p.price.times(*qty)))
            .try_fold(Money::usd(0), |acc, line| acc.plus(&line?))
    }

    /// Displayed form of a computed amount; arithmetic errors show as text
    fn shown(amount: ProbeResult<Money>) -> String {
        amount.map_or_else(|e| e.to_string(), |m| m.to_string())
    }

    fn cart_menu_text(&self) -> String {
        if self.state.cart.is_empty() {
            return "Your shopping cart is empty!".to_string();
        }
        let total = Self::shown(self.cart_total());
        let mut text = String::new();
        for (id, qty) in &self.state.cart {
            if let Some(p) = self.site.product(*id) {
                let line = Self::shown(p.price.times(*qty));
                text.push_str(&format!("{} x {} {line} ", p.name, qty));
            }
        }
        text.push_str(&format!("Sub-Total {total} Total {total} View Cart Checkout"));
        text
    }

    fn listed_products(&self) -> Vec<&MockProduct> {
        match &self.state.page {
            MockPage::Home => self.site.featured(),
            MockPage::Search(term) => self.site.search(term),
            _ => Vec::new(),
        }
    }

    fn current_product(&self) -> Option<&MockProduct> {
        match self.state.page {
            MockPage::Product(id) => self.site.product(id),
            _ => None,
        }
    }

    fn on_reviews(&self) -> bool {
        self.current_product().is_some() && self.state.tab == ProductTab::Reviews
    }

    fn input(&self, key: &'static str) -> String {
        self.state.inputs.get(key).cloned().unwrap_or_default()
    }

    /// Render the elements for a known target on the current page
    fn render(&self, target: Target) -> Vec<(String, bool)> {
        let state = &self.state;
        let header = state.page != MockPage::Blank;
        let one = |text: String, visible: bool| vec![(text, visible)];
        match target {
            _ if !header => Vec::new(),
            Target::SearchInput => one(self.input(navbar::SEARCH_INPUT), true),
            Target::SearchButton => one(String::new(), true),
            Target::Logo => one("Your Store".into(), true),
            Target::AccountToggles => vec![
                ("$ Currency".into(), true),
                (" My Account".into(), true),
            ],
            Target::AccountMenuLinks => {
                let labels: &[&str] = if state.authenticated {
                    &["My Account", "Order History", "Logout"]
                } else {
                    &["Register", "Login"]
                };
                labels
                    .iter()
                    .map(|l| ((*l).to_string(), state.account_menu_open))
                    .collect()
            }
            Target::CheckoutLink => one("Checkout".into(), true),
            Target::CartToggle => {
                let count: u32 = state.cart.iter().map(|(_, qty)| qty).sum();
                one(format!("{count} item(s) - {}", Self::shown(self.cart_total())), true)
            }
            Target::CartMenu if state.cart_menu_open => one(self.cart_menu_text(), true),
            Target::CartMenu => Vec::new(),
            Target::CartAlert => state
                .page_alert
                .iter()
                .filter(|a| a.success)
                .map(|a| (a.text.clone(), true))
                .collect(),
            Target::LoginWarning => state
                .page_alert
                .iter()
                .filter(|a| !a.success)
                .map(|a| (a.text.clone(), true))
                .collect(),
            Target::Heading => match &state.page {
                MockPage::Search(term) => one(format!("Search - {term}"), true),
                MockPage::Product(_) => self
                    .current_product()
                    .map(|p| one(p.name.clone(), true))
                    .unwrap_or_default(),
                MockPage::Account => one("My Account".into(), true),
                MockPage::Cart => one("Shopping Cart".into(), true),
                MockPage::Login { .. } => one("Returning Customer".into(), true),
                _ => Vec::new(),
            },
            Target::ProductTitles => self
                .listed_products()
                .into_iter()
                .map(|p| (p.name.clone(), true))
                .collect(),
            Target::ProductCards => self
                .listed_products()
                .into_iter()
                .map(|p| (format!("{} {} {}", p.name, p.description, p.price), true))
                .collect(),
            Target::Price => self
                .current_product()
                .map(|p| one(p.price.to_string(), true))
                .unwrap_or_default(),
            Target::DescriptionTab => self
                .current_product()
                .map(|_| one("Description".into(), true))
                .unwrap_or_default(),
            Target::DescriptionText => self
                .current_product()
                .map(|p| one(format!(" {} ", p.description), state.tab == ProductTab::Description))
                .unwrap_or_default(),
            Target::ReviewsTab => self
                .current_product()
                .map(|_| one("Reviews (0)".into(), true))
                .unwrap_or_default(),
            Target::ReviewAuthor if self.current_product().is_some() => {
                one(self.input(product::REVIEW_AUTHOR), self.on_reviews())
            }
            Target::ReviewText if self.current_product().is_some() => {
                one(self.input(product::REVIEW_TEXT), self.on_reviews())
            }
            Target::RatingMax | Target::ReviewSubmit if self.current_product().is_some() => {
                one(String::new(), self.on_reviews())
            }
            Target::ReviewAlert => state
                .review_alert
                .iter()
                .filter(|a| a.success)
                .map(|a| (format!("\n  {}\n", a.text), self.on_reviews()))
                .collect(),
            Target::AddToCart if self.current_product().is_some() => {
                one("Add to Cart".into(), true)
            }
            Target::CheckoutConfirm if state.page == MockPage::Checkout => {
                one(String::new(), true)
            }
            Target::CheckoutLoginLink
                if state.page == MockPage::Checkout && !state.authenticated =>
            {
                one("login page".into(), true)
            }
            Target::OrderTotal if state.page == MockPage::Checkout && !state.cart.is_empty() => {
                let total = self
                    .cart_total()
                    .and_then(|t| t.plus(&self.site.checkout_adjustment));
                one(Self::shown(total), true)
            }
            Target::LoginEmail if matches!(state.page, MockPage::Login { .. }) => {
                one(self.input(login::EMAIL), true)
            }
            Target::LoginPassword if matches!(state.page, MockPage::Login { .. }) => {
                one(String::new(), true)
            }
            Target::LoginSubmit if matches!(state.page, MockPage::Login { .. }) => {
                one("Login".into(), true)
            }
            _ => Vec::new(),
        }
    }

    fn resolve(&self, selector: &Selector) -> ProbeResult<(Option<Target>, Vec<ElementHandle>)> {
        let (css, text) = match selector {
            Selector::Css(css) => (css.as_str(), None),
            Selector::CssWithText { css, text } => (css.as_str(), Some(text.as_str())),
            Selector::XPath(_) => {
                return Err(ProbeError::driver("XPath selectors are not simulated"));
            }
        };
        let Some((_, target)) = classify(css) else {
            return Ok((None, Vec::new()));
        };
        let elements = self
            .render(target)
            .into_iter()
            .filter(|(content, _)| text.map_or(true, |t| content.contains(t)))
            .enumerate()
            .map(|(index, (content, visible))| ElementHandle::new(index, content, visible))
            .collect();
        Ok((Some(target), elements))
    }

    fn interactable(&self, selector: &Selector, nth: usize) -> ProbeResult<(Target, ElementHandle)> {
        let (target, elements) = self.resolve(selector)?;
        let element = elements
            .into_iter()
            .nth(nth)
            .ok_or_else(|| ProbeError::not_found(format!("{selector} [{nth}]")))?;
        if !element.visible {
            return Err(ProbeError::driver(format!(
                "{selector} [{nth}] is not visible"
            )));
        }
        let target = target.ok_or_else(|| ProbeError::not_found(selector.to_string()))?;
        Ok((target, element))
    }

    fn submit_review(&mut self) {
        let author = self.input(product::REVIEW_AUTHOR);
        let text = self.input(product::REVIEW_TEXT);
        let problem = if !(3..=25).contains(&author.chars().count()) {
            Some("Warning: Review Name must be between 3 and 25 characters!")
        } else if !(25..=1000).contains(&text.chars().count()) {
            Some("Warning: Review Text must be between 25 and 1000 characters!")
        } else if self.state.rating.is_none() {
            Some("Warning: Please select a review rating!")
        } else {
            None
        };
        self.state.review_alert = Some(match problem {
            Some(warning) => Alert {
                text: warning.to_string(),
                success: false,
            },
            None => Alert {
                text: self.site.review_reply.clone(),
                success: true,
            },
        });
    }

    fn add_to_cart(&mut self) {
        let Some((id, name)) = self.current_product().map(|p| (p.id, p.name.clone())) else {
            return;
        };
        match self.state.cart.iter_mut().find(|(pid, _)| *pid == id) {
            Some((_, qty)) => *qty += 1,
            None => self.state.cart.push((id, 1)),
        }
        let _ = self
            .state
            .session_storage
            .insert("cart_notice".into(), name.clone());
        self.state.page_alert = Some(Alert {
            text: format!("Success: You have added {name} to your shopping cart!"),
            success: true,
        });
    }

    fn submit_login(&mut self, back_to_checkout: bool) {
        let email = self.input(login::EMAIL);
        let password = self.input(login::PASSWORD);
        let accepted = self
            .site
            .accounts
            .iter()
            .any(|(e, p)| *e == email && *p == password);
        if accepted {
            self.state.authenticated = true;
            self.goto(if back_to_checkout {
                MockPage::Checkout
            } else {
                MockPage::Account
            });
        } else {
            self.state.page_alert = Some(Alert {
                text: LOGIN_REJECTED.to_string(),
                success: false,
            });
        }
    }

    fn ensure_open(&self) -> ProbeResult<()> {
        if self.state.closed {
            return Err(ProbeError::driver("browser was closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl StorefrontDriver for MockStorefront {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.log.push(format!("navigate:{url}"));
        let page = self.page_for_url(url)?;
        self.goto(page);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.ensure_open()?;
        Ok(Self::url_for(&self.state.page))
    }

    async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        self.ensure_open()?;
        Ok(self.resolve(selector)?.1)
    }

    async fn click(&mut self, selector: &Selector, nth: usize) -> ProbeResult<()> {
        self.ensure_open()?;
        self.log.push(format!("click:{selector}#{nth}"));
        let (target, element) = self.interactable(selector, nth)?;
        match target {
            Target::SearchButton => {
                let term = self.input(navbar::SEARCH_INPUT);
                self.goto(MockPage::Search(term));
            }
            Target::ProductTitles => {
                let id = self.listed_products().get(element.index).map(|p| p.id);
                if let Some(id) = id {
                    self.goto(MockPage::Product(id));
                }
            }
            Target::AccountToggles if element.text.contains("My Account") => {
                self.state.account_menu_open = true;
            }
            Target::AccountMenuLinks => match element.text.as_str() {
                "Login" => self.goto(MockPage::Login {
                    back_to_checkout: false,
                }),
                "Logout" => {
                    self.state.authenticated = false;
                    self.goto(MockPage::Home);
                }
                "My Account" => self.goto(MockPage::Account),
                _ => {}
            },
            Target::Logo => self.goto(MockPage::Home),
            Target::DescriptionTab => self.state.tab = ProductTab::Description,
            Target::ReviewsTab => self.state.tab = ProductTab::Reviews,
            Target::RatingMax => self.state.rating = Some(5),
            Target::ReviewSubmit => self.submit_review(),
            Target::AddToCart => self.add_to_cart(),
            Target::CartToggle => self.state.cart_menu_open = true,
            Target::CheckoutLink if self.state.cart.is_empty() => self.goto(MockPage::Cart),
            Target::CheckoutLink => self.goto(MockPage::Checkout),
            Target::CheckoutLoginLink => self.goto(MockPage::Login {
                back_to_checkout: true,
            }),
            Target::LoginSubmit => {
                if let MockPage::Login { back_to_checkout } = self.state.page {
                    self.submit_login(back_to_checkout);
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn type_text(&mut self, selector: &Selector, nth: usize, text: &str) -> ProbeResult<()> {
        self.ensure_open()?;
        self.log.push(format!("type:{selector}#{nth}"));
        let (target, _) = self.interactable(selector, nth)?;
        let key = match target {
            Target::SearchInput => navbar::SEARCH_INPUT,
            Target::ReviewAuthor => product::REVIEW_AUTHOR,
            Target::ReviewText => product::REVIEW_TEXT,
            Target::LoginEmail => login::EMAIL,
            Target::LoginPassword => login::PASSWORD,
            _ => {
                return Err(ProbeError::driver(format!("{selector} is not an input")));
            }
        };
        let _ = self.state.inputs.insert(key, text.to_string());
        Ok(())
    }

    async fn clear_storage(&mut self) -> ProbeResult<()> {
        self.ensure_open()?;
        self.log.push("clear_storage".to_string());
        let state = &mut self.state;
        state.cookies.clear();
        state.local_storage.clear();
        state.session_storage.clear();
        // cart and login live in the server session keyed by the cookie
        state.cart.clear();
        state.authenticated = false;
        Ok(())
    }

    async fn storage_snapshot(&self) -> ProbeResult<StorageSnapshot> {
        self.ensure_open()?;
        self.log.push("storage_snapshot".to_string());
        Ok(StorageSnapshot {
            cookies: self.state.cookies.len(),
            local: self.state.local_storage.len(),
            session: self.state.session_storage.len(),
        })
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.log.push("close".to_string());
        self.state.closed = true;
        Ok(())
    }
}
