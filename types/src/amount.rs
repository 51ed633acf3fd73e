//! Token amounts.
//!
//! The ledger reports balances and accepts transfer amounts as JSON numbers
//! with a fractional part, so amounts are carried as `f64`. Every `Amount`
//! is finite and non-negative; the wire decoder enforces this too, so a
//! negative balance from the service surfaces as a decode failure.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A non-negative, finite quantity of the ledger's coin.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Self = Self(0.0);

    /// Ticker shown next to balances.
    pub const UNIT: &'static str = "AZT";

    pub fn new(value: f64) -> Result<Self, TypesError> {
        if !value.is_finite() {
            return Err(TypesError::InvalidAmount(format!("{value} is not finite")));
        }
        if value < 0.0 {
            return Err(TypesError::InvalidAmount(format!("{value} is negative")));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }
}

impl TryFrom<f64> for Amount {
    type Error = TypesError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, Self::UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(Amount::new(-0.5).is_err());
        assert!(Amount::new(f64::NAN).is_err());
        assert!(Amount::new(f64::INFINITY).is_err());
    }

    #[test]
    fn zero_is_valid_but_not_positive() {
        let zero = Amount::new(0.0).unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
    }

    #[test]
    fn decodes_integers_and_fractions() {
        let a: Amount = serde_json::from_str("100").unwrap();
        assert_eq!(a.value(), 100.0);
        let b: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(b.value(), 12.5);
    }

    #[test]
    fn decode_rejects_negative() {
        assert!(serde_json::from_str::<Amount>("-1").is_err());
    }

    #[test]
    fn display_includes_unit() {
        assert_eq!(Amount::new(100.0).unwrap().to_string(), "100 AZT");
        assert_eq!(Amount::new(2.25).unwrap().to_string(), "2.25 AZT");
    }
}
