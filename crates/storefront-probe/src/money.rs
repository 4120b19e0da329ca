//! Currency amounts as the storefront displays them (`$1,202.00`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::result::{ProbeError, ProbeResult};

/// An amount in minor units (cents) with its display symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    symbol: String,
}

fn money_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            // sign, symbol, integer part with optional thousands separators, 1-2 decimals
            Regex::new(r"^\s*(-?)\s*([^\d\s.,-]*)\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?\s*$")
                .ok()
        })
        .as_ref()
}

impl Money {
    /// Create from minor units
    #[must_use]
    pub fn from_minor(minor: i64, symbol: impl Into<String>) -> Self {
        Self {
            minor,
            symbol: symbol.into(),
        }
    }

    /// Dollars
    #[must_use]
    pub fn usd(minor: i64) -> Self {
        Self::from_minor(minor, "$")
    }

    /// Amount in minor units
    #[must_use]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Currency symbol
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Line total for `quantity` units
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] if the total does not fit.
    pub fn times(&self, quantity: u32) -> ProbeResult<Self> {
        self.minor
            .checked_mul(i64::from(quantity))
            .map(|minor| Self::from_minor(minor, self.symbol.clone()))
            .ok_or_else(|| overflow(format!("{self} x {quantity}")))
    }

    /// Sum of two amounts in the same currency
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionMismatch`] if the symbols differ or the
    /// sum does not fit.
    pub fn plus(&self, other: &Self) -> ProbeResult<Self> {
        if self.symbol != other.symbol {
            return Err(ProbeError::mismatch(
                "currency symbol",
                self.symbol.as_str(),
                other.symbol.as_str(),
            ));
        }
        self.minor
            .checked_add(other.minor)
            .map(|minor| Self::from_minor(minor, self.symbol.clone()))
            .ok_or_else(|| overflow(format!("{self} + {other}")))
    }
}

fn overflow(operation: String) -> ProbeError {
    ProbeError::mismatch("amount arithmetic", "an amount within range", operation)
}

impl FromStr for Money {
    type Err = ProbeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || ProbeError::mismatch("currency amount", "<symbol><amount>.<cents>", text);
        let caps = money_pattern()
            .and_then(|re| re.captures(text))
            .ok_or_else(invalid)?;
        let negative = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let symbol = caps.get(2).map_or("", |m| m.as_str());
        let units: i64 = caps[3].replace(',', "").parse().map_err(|_| invalid())?;
        let cents = match caps.get(4).map(|m| m.as_str()) {
            None => 0,
            Some(d) if d.len() == 1 => d.parse::<i64>().map_err(|_| invalid())? * 10,
            Some(d) => d.parse::<i64>().map_err(|_| invalid())?,
        };
        let minor = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(invalid)?;
        Ok(Self::from_minor(if negative { -minor } else { minor }, symbol))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        let units = (abs / 100).to_string();
        let mut grouped = String::with_capacity(units.len() + units.len() / 3);
        for (i, ch) in units.chars().enumerate() {
            if i > 0 && (units.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}{}{grouped}.{:02}", self.symbol, abs % 100)
    }
}
