//! Monetary amounts.
//!
//! Prices are held as integer cents so that line totals and order totals add up
//! exactly. Form inputs arrive as decimal text (`"10"`, `"10.5"`, `"10.00"`) and are
//! parsed with [`Money::from_str`](std::str::FromStr).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

/// Money amount in cents (to avoid floating point issues)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a new money amount from cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new money amount from whole currency units (converted to cents)
    #[must_use]
    pub const fn from_major(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    /// Returns the value in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Multiplies a unit price by a quantity
    ///
    /// Saturates instead of overflowing.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as i64))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Errors from parsing a decimal amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    /// The input was empty or whitespace
    #[error("amount is empty")]
    Empty,

    /// The input is not a decimal number
    #[error("`{0}` is not a valid amount")]
    Invalid(String),

    /// More than two digits after the decimal point
    #[error("`{0}` has more than two decimal places")]
    TooPrecise(String),

    /// The amount does not fit in cents
    #[error("`{0}` is out of range")]
    OutOfRange(String),
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(MoneyParseError::Invalid(trimmed.to_string()));
        }
        if unsigned.ends_with('.') {
            return Err(MoneyParseError::Invalid(trimmed.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(trimmed.to_string()));
        }

        let out_of_range = || MoneyParseError::OutOfRange(trimmed.to_string());
        let whole: i64 = whole.parse().map_err(|_| out_of_range())?;
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| out_of_range())? * 10,
            _ => fraction.parse().map_err(|_| out_of_range())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -cents } else { cents }))
    }
}
