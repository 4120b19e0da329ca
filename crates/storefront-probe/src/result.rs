//! Result and error types for storefront probes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or asserting a storefront flow
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Locator or configuration misuse. Fatal to the whole run.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// An expected UI element or product is absent
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked for
        what: String,
    },

    /// A readiness condition was not met in time
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// Condition that was awaited
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Observed value differs from the expected one
    #[error("Assertion failed for {what}: expected {expected:?}, observed {observed:?}")]
    AssertionMismatch {
        /// What was asserted
        what: String,
        /// Expected value
        expected: String,
        /// Observed value
        observed: String,
    },

    /// Fixture source missing or malformed
    #[error("Failed to load fixture '{name}': {message}")]
    FixtureLoad {
        /// Fixture name
        name: String,
        /// Error message
        message: String,
    },

    /// Fixture field referenced but absent
    #[error("Fixture '{fixture}' has no field '{field}'")]
    MissingField {
        /// Fixture name
        fixture: String,
        /// Missing field
        field: String,
    },

    /// A lazy element sequence was read after the page navigated away
    #[error("Element sequence for {what} is stale: page moved from {from} to {to}")]
    StaleSequence {
        /// Locator the sequence iterates
        what: String,
        /// URL when the sequence was created
        from: String,
        /// Current URL
        to: String,
    },

    /// Browser storage still holds entries after the isolation reset
    #[error("Isolation reset left {cookies} cookies, {local} local and {session} session entries")]
    IsolationLeak {
        /// Remaining cookies
        cookies: usize,
        /// Remaining local storage entries
        local: usize,
        /// Remaining session storage entries
        session: usize,
    },

    /// Browser driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },
}

/// Coarse classification of a [`ProbeError`], used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ProbeError::Configuration`]
    Configuration,
    /// See [`ProbeError::NotFound`]
    NotFound,
    /// See [`ProbeError::Timeout`]
    Timeout,
    /// See [`ProbeError::AssertionMismatch`]
    AssertionMismatch,
    /// See [`ProbeError::FixtureLoad`]
    FixtureLoad,
    /// See [`ProbeError::MissingField`]
    MissingField,
    /// See [`ProbeError::StaleSequence`]
    StaleSequence,
    /// See [`ProbeError::IsolationLeak`]
    IsolationLeak,
    /// Driver and launch failures
    Driver,
}

impl ProbeError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create an assertion mismatch
    #[must_use]
    pub fn mismatch(
        what: impl Into<String>,
        expected: impl Into<String>,
        observed: impl Into<String>,
    ) -> Self {
        Self::AssertionMismatch {
            what: what.into(),
            expected: expected.into(),
            observed: observed.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::AssertionMismatch { .. } => ErrorKind::AssertionMismatch,
            Self::FixtureLoad { .. } => ErrorKind::FixtureLoad,
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::StaleSequence { .. } => ErrorKind::StaleSequence,
            Self::IsolationLeak { .. } => ErrorKind::IsolationLeak,
            Self::Driver { .. } | Self::BrowserLaunch { .. } => ErrorKind::Driver,
        }
    }

    /// Whether the error must stop the whole run rather than one scenario
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration)
    }

    /// Expected and observed values, when the error carries them
    #[must_use]
    pub fn expected_observed(&self) -> Option<(&str, &str)> {
        match self {
            Self::AssertionMismatch {
                expected, observed, ..
            } => Some((expected, observed)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_names_both_values() {
        let err = ProbeError::mismatch("product price", "$602.00", "$500.00");
        let text = err.to_string();
        assert!(text.contains("product price"));
        assert!(text.contains("$602.00"));
        assert!(text.contains("$500.00"));
        assert_eq!(err.expected_observed(), Some(("$602.00", "$500.00")));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ProbeError::not_found("MacBook").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ProbeError::Timeout {
                what: "x".into(),
                ms: 8000
            }
            .kind(),
            ErrorKind::Timeout
        );
        assert_eq!(ProbeError::driver("boom").kind(), ErrorKind::Driver);
        assert_eq!(
            ProbeError::BrowserLaunch {
                message: "no chromium".into()
            }
            .kind(),
            ErrorKind::Driver
        );
    }

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(ProbeError::configuration("no locator 'logo'").is_fatal());
        assert!(!ProbeError::not_found("x").is_fatal());
        assert!(!ProbeError::MissingField {
            fixture: "testData".into(),
            field: "warning".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_timeout_display() {
        let err = ProbeError::Timeout {
            what: "#content h1".into(),
            ms: 8000,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 8000ms waiting for #content h1"
        );
        assert!(err.expected_observed().is_none());
    }
}
