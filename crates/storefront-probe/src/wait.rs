//! Wait mechanisms for synchronizing with the storefront.
//!
//! Condition waits poll under a bounded deadline and fail with
//! [`ProbeError::Timeout`]. Fixed settle pauses exist for the two places the
//! storefront gives no readiness signal (reviews tab, cart dropdown).

use std::time::Duration;
use tokio::time::Instant;

use crate::locator::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};
use crate::result::{ProbeError, ProbeResult};

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for condition waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout
    pub timeout: Duration,
    /// Polling interval
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start a deadline for the condition described by `what`
    #[must_use]
    pub fn deadline(&self, what: impl Into<String>) -> Deadline {
        Deadline {
            what: what.into(),
            expires_at: Instant::now() + self.timeout,
            timeout: self.timeout,
            poll_interval: self.poll_interval,
        }
    }
}

// =============================================================================
// DEADLINE
// =============================================================================

/// Polling budget for one condition wait
///
/// ```ignore
/// let mut deadline = options.deadline("cart alert");
/// loop {
///     if let Some(found) = probe().await? {
///         return Ok(found);
///     }
///     deadline.tick().await?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Deadline {
    what: String,
    expires_at: Instant,
    timeout: Duration,
    poll_interval: Duration,
}

impl Deadline {
    /// Sleep one polling interval, or fail if the deadline has passed
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] once the timeout has elapsed.
    pub async fn tick(&mut self) -> ProbeResult<()> {
        let now = Instant::now();
        if now >= self.expires_at {
            return Err(self.expired());
        }
        let remaining = self.expires_at - now;
        tokio::time::sleep(self.poll_interval.min(remaining)).await;
        Ok(())
    }

    /// The error this deadline produces when it expires
    #[must_use]
    pub fn expired(&self) -> ProbeError {
        ProbeError::Timeout {
            what: self.what.clone(),
            ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Description of the awaited condition
    #[must_use]
    pub fn what(&self) -> &str {
        &self.what
    }
}

// =============================================================================
// SETTLE
// =============================================================================

/// Fixed pause used where no readiness signal exists.
///
/// A suspension point, never a busy wait.
pub async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = WaitOptions::default();
        assert_eq!(options.timeout, Duration::from_millis(8000));
        assert_eq!(options.poll_interval, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_deadline_ticks_until_expiry() {
        let options = WaitOptions::new()
            .with_timeout(Duration::from_millis(30))
            .with_poll_interval(Duration::from_millis(5));
        let mut deadline = options.deadline("never true");
        let mut ticks = 0;
        let err = loop {
            match deadline.tick().await {
                Ok(()) => ticks += 1,
                Err(e) => break e,
            }
        };
        assert!(ticks >= 1);
        match err {
            ProbeError::Timeout { what, ms } => {
                assert_eq!(what, "never true");
                assert_eq!(ms, 30);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_zero_timeout_fails_immediately() {
        let options = WaitOptions::new().with_timeout(Duration::ZERO);
        let mut deadline = options.deadline("instant");
        assert!(deadline.tick().await.is_err());
        assert_eq!(deadline.what(), "instant");
    }

    #[tokio::test]
    async fn test_settle_zero_returns() {
        settle(Duration::ZERO).await;
        settle(Duration::from_millis(1)).await;
    }
}
