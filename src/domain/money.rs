use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of decimal places in the currency's minor unit (cents).
pub const DEFAULT_MINOR_UNIT_SCALE: u32 = 2;

/// Largest amount a single payment or due may carry (ten digits, two of
/// them decimal). Keeps report sums and products far from `Decimal` overflow.
pub const MAX_AMOUNT: Decimal = dec!(99999999.99);

/// A strictly positive monetary amount.
///
/// Wraps `rust_decimal::Decimal` so that every payment and due amount that
/// reaches the ledger has already been checked for sign and precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Accepts any value greater than zero and at most [`MAX_AMOUNT`].
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must be greater than 0, got {value}"
            )));
        }
        if value > MAX_AMOUNT {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must not exceed {MAX_AMOUNT}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Like [`Amount::new`], but also rejects values finer than the minor unit
    /// (e.g. `10.005` when the currency has two decimal places).
    pub fn with_scale(value: Decimal, scale: u32) -> Result<Self, LedgerError> {
        let amount = Self::new(value)?;
        if value.normalize().scale() > scale {
            return Err(LedgerError::InvalidAmount(format!(
                "{value} has more than {scale} decimal places"
            )));
        }
        Ok(amount)
    }

    /// Parses user-supplied text. Non-numeric text is `InvalidInput`; a number
    /// that fails the sign or precision check is `InvalidAmount`.
    pub fn parse(text: &str, scale: u32) -> Result<Self, LedgerError> {
        let value = Decimal::from_str(text.trim())
            .map_err(|_| LedgerError::InvalidInput(format!("'{text}' is not a valid amount")))?;
        Self::with_scale(value, scale)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_amount_upper_bound() {
        assert!(Amount::new(MAX_AMOUNT).is_ok());
        assert!(matches!(
            Amount::new(dec!(100000000)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::parse("50000000000000000000000000000", 2),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(serde_json::from_str::<Amount>("\"100000000.00\"").is_err());
    }

    #[test]
    fn test_amount_minor_unit_precision() {
        assert!(Amount::with_scale(dec!(5000.50), 2).is_ok());
        // Trailing zeros do not count against the scale
        assert!(Amount::with_scale(dec!(12.5000), 2).is_ok());
        assert!(matches!(
            Amount::with_scale(dec!(0.001), 2),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_amount_parse() {
        assert_eq!(Amount::parse(" 5000 ", 2).unwrap().value(), dec!(5000));
        assert!(matches!(
            Amount::parse("five", 2),
            Err(LedgerError::InvalidInput(_))
        ));
        assert!(matches!(
            Amount::parse("-3", 2),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_amount_deserialization_rejects_zero() {
        let ok: Amount = serde_json::from_str("\"12.00\"").unwrap();
        assert_eq!(ok.value(), dec!(12));
        assert!(serde_json::from_str::<Amount>("\"0\"").is_err());
    }
}
