//! Assertions for storefront observations.
//!
//! Every check compares an expected value against what the page showed.
//! A failing check carries both, so a report can say
//! "expected `$602.00`, observed `$1,204.00`".

use std::fmt::Display;

use crate::money::Money;
use crate::result::{ProbeError, ProbeResult};

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// What was checked
    pub what: String,
    /// Expected value, as text
    pub expected: String,
    /// Observed value, as text
    pub observed: String,
}

impl AssertionResult {
    fn new(passed: bool, what: &str, expected: impl Display, observed: impl Display) -> Self {
        Self {
            passed,
            what: what.to_string(),
            expected: expected.to_string(),
            observed: observed.to_string(),
        }
    }

    /// Convert into a step result
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] when the assertion failed.
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::AssertionMismatch {
                what: self.what,
                expected: self.expected,
                observed: self.observed,
            })
        }
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Exact match after trimming surrounding whitespace on both sides
    #[must_use]
    pub fn text_equals(what: &str, expected: &str, observed: &str) -> AssertionResult {
        AssertionResult::new(
            expected.trim() == observed.trim(),
            what,
            expected.trim(),
            observed.trim(),
        )
    }

    /// Substring match, case sensitive
    #[must_use]
    pub fn contains(what: &str, needle: &str, observed: &str) -> AssertionResult {
        AssertionResult::new(
            observed.contains(needle),
            what,
            format!("text containing {needle:?}"),
            observed.trim(),
        )
    }

    /// Collection has the expected number of items
    #[must_use]
    pub fn has_count(what: &str, expected: usize, observed: usize) -> AssertionResult {
        AssertionResult::new(expected == observed, what, expected, observed)
    }

    /// Displayed amount equals `expected`
    ///
    /// Text that is not an amount at all fails with the raw text as observed.
    #[must_use]
    pub fn amount_equals(what: &str, expected: &Money, observed: &str) -> AssertionResult {
        let passed = observed
            .parse::<Money>()
            .is_ok_and(|amount| &amount == expected);
        AssertionResult::new(passed, what, expected, observed.trim())
    }

    /// Condition holds
    #[must_use]
    pub fn is_true(what: &str, condition: bool) -> AssertionResult {
        AssertionResult::new(condition, what, true, condition)
    }
}

/// Exact text check as a step result
pub fn expect_text(what: &str, expected: &str, observed: &str) -> ProbeResult<()> {
    Assertion::text_equals(what, expected, observed).into_result()
}

/// Substring check as a step result
pub fn expect_contains(what: &str, needle: &str, observed: &str) -> ProbeResult<()> {
    Assertion::contains(what, needle, observed).into_result()
}

/// Count check as a step result
pub fn expect_count(what: &str, expected: usize, observed: usize) -> ProbeResult<()> {
    Assertion::has_count(what, expected, observed).into_result()
}

/// Amount check as a step result
pub fn expect_amount(what: &str, expected: &Money, observed: &str) -> ProbeResult<()> {
    Assertion::amount_equals(what, expected, observed).into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_equals_trims() {
        assert!(Assertion::text_equals("name", "MacBook", "  MacBook\n").passed);
        assert!(!Assertion::text_equals("name", "MacBook", "MacBook Air").passed);
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        assert!(Assertion::contains("alert", "Success", "Success: added").passed);
        assert!(!Assertion::contains("alert", "Success", "success: added").passed);
    }

    #[test]
    fn test_amount_equals_parses_display_text() {
        let expected = Money::usd(60_200);
        assert!(Assertion::amount_equals("total", &expected, " $602.00 ").passed);
        assert!(!Assertion::amount_equals("total", &expected, "$1,204.00").passed);
        assert!(!Assertion::amount_equals("total", &expected, "free").passed);
    }

    #[test]
    fn test_failure_carries_expected_and_observed() {
        let err = expect_amount("order total", &Money::usd(60_200), "$1,204.00").unwrap_err();
        assert_eq!(err.expected_observed(), Some(("$602.00", "$1,204.00")));
        assert!(err.to_string().contains("order total"));
    }

    #[test]
    fn test_count_and_truth() {
        assert!(expect_count("products", 4, 4).is_ok());
        let err = expect_count("products", 4, 3).unwrap_err();
        assert_eq!(err.expected_observed(), Some(("4", "3")));
        assert!(Assertion::is_true("flag", true).into_result().is_ok());
        assert!(Assertion::is_true("flag", false).into_result().is_err());
    }

    #[test]
    fn test_expect_text_and_contains() {
        assert!(expect_text("heading", "Description", "Description ").is_ok());
        assert!(expect_contains("menu", "x 1", "MacBook x 1 $602.00").is_ok());
        assert!(expect_contains("menu", "x 2", "MacBook x 1 $602.00").is_err());
    }
}
