//! Money type for prices and totals
//!
//! Wraps a `rust_decimal::Decimal` so that prices keep the exact value they
//! were written with and totals never pick up floating-point drift. Arithmetic
//! saturates instead of panicking on absurd inputs read from a corrupt file.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// A monetary amount (unit price, line total or list total)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// A zero amount
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Wrap an existing decimal
    pub const fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    /// Create an amount from whole units and a number of decimal places,
    /// e.g. `Money::new(4050, 2)` is `40.50`
    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    /// Convert a spreadsheet number
    ///
    /// Goes through the shortest decimal representation of the float so that
    /// `0.1` stays `0.1` rather than its binary expansion. Values that do not
    /// fit a decimal read as zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::zero();
        }
        value.to_string().parse().map(Self::from_decimal).unwrap_or_default()
    }

    /// Nearest float, for numeric spreadsheet cells
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiply by an item quantity
    pub fn times(&self, quantity: i64) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Parse an amount strictly
    ///
    /// Accepts plain decimal notation: "50", "50.0", "-3.25", "+7".
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        s.parse::<Decimal>()
            .map(Self::from_decimal)
            .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))
    }

    /// Format for people, rounded to two places, with a currency label
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if symbol.is_empty() {
            format!("{:.2}", rounded)
        } else {
            format!("{} {:.2}", symbol, rounded)
        }
    }
}

impl fmt::Display for Money {
    /// Writes the exact stored value, keeping its scale (`50.0` stays `50.0`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    #[error("Empty money value")]
    Empty,
    #[error("Invalid money format: {0}")]
    InvalidFormat(String),
}
