//! StorefrontDriver - abstract browser automation seam.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StorefrontDriver (async trait)                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐      ┌──────────────────────────┐   │
//! │  │  CdpDriver          │      │  MockStorefront          │   │
//! │  │  chromiumoxide/CDP  │      │  in-memory demo shop     │   │
//! │  │  (`browser` feature)│      │  (tests, --offline)      │   │
//! │  └─────────────────────┘      └──────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core only relies on the primitives below and on their completion
//! contract: a returned future means the command was delivered, not that the
//! page reached any particular state. Readiness is the caller's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Selector;
use crate::result::ProbeResult;

/// Snapshot of one matched element at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Index among the elements matched by the same selector
    pub index: usize,
    /// Text content, untrimmed
    pub text: String,
    /// Whether the element is rendered
    pub visible: bool,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(index: usize, text: impl Into<String>, visible: bool) -> Self {
        Self {
            index,
            text: text.into(),
            visible,
        }
    }

    /// Text with surrounding whitespace removed
    #[must_use]
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// Counts of persisted browser state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// Cookies visible to the session
    pub cookies: usize,
    /// Local storage entries
    pub local: usize,
    /// Session storage entries
    pub session: usize,
}

impl StorageSnapshot {
    /// True when nothing is persisted
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cookies == 0 && self.local == 0 && self.session == 0
    }
}

/// Browser automation primitives
#[async_trait]
pub trait StorefrontDriver: Send + Sync + fmt::Debug {
    /// Navigate to URL and wait for the load to finish
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// All elements currently matching `selector`, in document order
    async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>>;

    /// Click the `nth` element matching `selector`
    async fn click(&mut self, selector: &Selector, nth: usize) -> ProbeResult<()>;

    /// Replace the value of the `nth` input matching `selector`
    async fn type_text(&mut self, selector: &Selector, nth: usize, text: &str) -> ProbeResult<()>;

    /// Delete cookies, local storage and session storage
    async fn clear_storage(&mut self) -> ProbeResult<()>;

    /// Count persisted browser state
    async fn storage_snapshot(&self) -> ProbeResult<StorageSnapshot>;

    /// Close the browser
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Opens independent browser sessions, one per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a fresh driver with no state shared with any other
    async fn open(&self) -> ProbeResult<Box<dyn StorefrontDriver>>;
}
