//! Money amounts, currencies and percentages.
//!
//! Amounts are always integers in the currency's minor unit (KRW and JPY have
//! no minor unit, so one unit is one won/yen; USD is in cents).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::validation::validate_one_of;

pub const CURRENCY_KRW: &str = "krw";
pub const CURRENCY_JPY: &str = "jpy";
pub const CURRENCY_USD: &str = "usd";

/// All supported ISO 4217 currency codes (lowercase, as the gateway expects).
pub const VALID_CURRENCIES: &[&str] = &[CURRENCY_KRW, CURRENCY_JPY, CURRENCY_USD];

pub fn validate_currency(currency: &str) -> Result<(), CoreError> {
    validate_one_of("currency", currency, VALID_CURRENCIES)
}

/// Validate a charge amount: strictly positive minor units.
pub fn validate_amount(amount: i64) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(format!(
            "Amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

/// An integer percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Percentage(i16);

impl Percentage {
    pub const MAX: i16 = 100;

    pub fn new(value: i16) -> Result<Self, CoreError> {
        if !(0..=Self::MAX).contains(&value) {
            return Err(CoreError::Validation(format!(
                "Percentage must be between 0 and 100, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i16 {
        self.0
    }

    /// `amount * self / 100`, rounded down.
    pub fn of(self, amount: i64) -> i64 {
        // i128 so large amounts cannot overflow the multiplication.
        ((amount as i128 * self.0 as i128) / 100) as i64
    }
}

impl TryFrom<i16> for Percentage {
    type Error = CoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for i16 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_bounds_inclusive() {
        assert!(Percentage::new(0).is_ok());
        assert!(Percentage::new(100).is_ok());
        assert!(Percentage::new(-1).is_err());
        assert!(Percentage::new(101).is_err());
    }

    #[test]
    fn percentage_of_rounds_down() {
        let p = Percentage::new(10).unwrap();
        assert_eq!(p.of(1_005), 100);
        assert_eq!(p.of(9), 0);
        assert_eq!(Percentage::new(100).unwrap().of(777), 777);
    }

    #[test]
    fn percentage_of_large_amount_does_not_overflow() {
        let p = Percentage::new(50).unwrap();
        assert_eq!(p.of(i64::MAX), i64::MAX / 2);
    }

    #[test]
    fn percentage_deserialization_validates() {
        assert!(serde_json::from_str::<Percentage>("30").is_ok());
        assert!(serde_json::from_str::<Percentage>("130").is_err());
    }

    #[test]
    fn currency_and_amount_validation() {
        assert!(validate_currency("krw").is_ok());
        assert!(validate_currency("KRW").is_err());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(1).is_ok());
    }
}
