//! Precision-safe decimal price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic so that limit prices are
//! forwarded to the brokerage exactly as quoted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price with exact decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Spread between two prices in basis points of `self`.
    #[inline]
    pub fn bps_to(&self, other: Price) -> Option<Decimal> {
        if self.is_zero() {
            return None;
        }
        Some((other.0 - self.0) / self.0 * Decimal::from(10000))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_is_positive() {
        assert!(!Price::new(dec!(0)).is_positive());
        assert!(!Price::new(dec!(-1.5)).is_positive());
        assert!(Price::new(dec!(100.50)).is_positive());
    }

    #[test]
    fn test_display_is_normalized() {
        assert_eq!(Price::new(dec!(100.500)).to_string(), "100.5");
        assert_eq!(Price::new(dec!(100)).to_string(), "100");
    }

    #[test]
    fn test_from_str() {
        let p: Price = "187.25".parse().unwrap();
        assert_eq!(p.inner(), dec!(187.25));
        assert!("abc".parse::<Price>().is_err());
    }

    #[test]
    fn test_bps_to() {
        let bid = Price::new(dec!(100));
        let ask = Price::new(dec!(100.50));
        assert_eq!(bid.bps_to(ask), Some(dec!(50)));
        assert_eq!(Price::ZERO.bps_to(ask), None);
    }
}
