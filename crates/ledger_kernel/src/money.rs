//! Money with exact decimal arithmetic
//!
//! All monetary values in the ledger route through [`Money`], a fixed-scale
//! wrapper over `rust_decimal`. The scale is two fractional digits system-wide
//! and every operation that could produce extra digits truncates toward zero,
//! so results are deterministic and auditable. Binary floating point is never
//! used; conversion from text happens only at the I/O boundary via
//! [`Money::parse`] and rejects malformed input instead of coercing.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by every amount.
pub const SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount at a fixed scale of two fractional digits.
///
/// Equality and ordering are total and exact. Amounts may be negative;
/// callers that require non-negative values (prices, payments) validate at
/// their own boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money value, truncating toward zero to the system scale.
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(SCALE, RoundingStrategy::ToZero))
    }

    /// Creates Money from an integer amount of minor units (cents).
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, SCALE))
    }

    /// The zero amount.
    pub fn zero() -> Self {
        Self(dec!(0))
    }

    /// Parses an amount from its text representation.
    ///
    /// This is the only path from user input into the core. Malformed text
    /// is rejected with [`MoneyError::InvalidAmount`]; there is no implicit
    /// float conversion.
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        let amount = Decimal::from_str_exact(trimmed)
            .map_err(|_| MoneyError::InvalidAmount(trimmed.to_string()))?;
        if amount.scale() > SCALE {
            return Err(MoneyError::InvalidAmount(format!(
                "{trimmed}: more than {SCALE} fractional digits"
            )));
        }
        Ok(Self::new(amount))
    }

    /// Returns the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition, failing only on overflow of the underlying decimal.
    pub fn checked_add(&self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction, failing only on overflow.
    pub fn checked_sub(&self, other: Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies the amount by a non-negative integer quantity.
    ///
    /// The result is truncated toward zero to the system scale. With both
    /// operands already at scale 2 the truncation never discards value, but
    /// the rule is fixed here so the behavior is defined once.
    pub fn multiply(&self, quantity: u32) -> Result<Money, MoneyError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// `self - other`, floored at zero. Used for outstanding balances where
    /// an overpaid order owes nothing rather than a negative amount.
    pub fn saturating_sub(&self, other: Money) -> Money {
        if other.0 >= self.0 {
            Money::zero()
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(other).expect("overflow in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(other).expect("overflow in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_truncates_toward_zero() {
        assert_eq!(Money::new(dec!(10.019)).amount(), dec!(10.01));
        assert_eq!(Money::new(dec!(-10.019)).amount(), dec!(-10.01));
    }

    #[test]
    fn test_from_minor() {
        assert_eq!(Money::from_minor(10050).amount(), dec!(100.50));
    }

    #[test]
    fn test_parse_valid() {
        assert_eq!(Money::parse("25.00").unwrap(), Money::from_minor(2500));
        assert_eq!(Money::parse(" 5 ").unwrap().amount(), dec!(5));
        assert_eq!(Money::parse("-3.50").unwrap().amount(), dec!(-3.50));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Money::parse("abc"),
            Err(MoneyError::InvalidAmount(_))
        ));
        assert!(matches!(
            Money::parse("10.00.1"),
            Err(MoneyError::InvalidAmount(_))
        ));
        assert!(matches!(Money::parse(""), Err(MoneyError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(matches!(
            Money::parse("1.005"),
            Err(MoneyError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(10000);
        let b = Money::from_minor(5000);

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
        assert_eq!((-b).amount(), dec!(-50.00));
    }

    #[test]
    fn test_multiply_matches_line_totals() {
        let price = Money::parse("10.00").unwrap();
        assert_eq!(price.multiply(2).unwrap().amount(), dec!(20.00));
        assert_eq!(price.multiply(0).unwrap(), Money::zero());
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let total = Money::from_minor(2000);
        let paid = Money::from_minor(2500);
        assert_eq!(total.saturating_sub(paid), Money::zero());
        assert_eq!(paid.saturating_sub(total), Money::from_minor(500));
    }

    #[test]
    fn test_ordering_is_exact() {
        assert!(Money::parse("10.01").unwrap() > Money::parse("10.00").unwrap());
        assert_eq!(Money::parse("10.0").unwrap(), Money::parse("10.00").unwrap());
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_minor(100), Money::from_minor(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_minor(350));
    }
}
