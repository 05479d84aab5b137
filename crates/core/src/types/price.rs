//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(10, 2)` and travel over the wire as decimal
//! strings (`"19.99"`), never as floats.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits a price carries.
pub const PRICE_SCALE: u32 = 2;

/// Errors produced when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("must be a positive number")]
    NotPositive,
    #[error("must have at most {PRICE_SCALE} decimal places")]
    TooPrecise,
    #[error("must not exceed {}", Price::MAX)]
    TooLarge,
    #[error("must be a decimal number")]
    Invalid,
}

/// A strictly positive monetary amount with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Largest value a `NUMERIC(10, 2)` column holds (`99999999.99`).
    ///
    /// The mantissa `9_999_999_999` split into its low and mid 32-bit words.
    pub const MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, PRICE_SCALE);

    /// Create a price, normalizing it to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the amount is zero or negative, has more than
    /// two fractional digits, or does not fit the storage column.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount.normalize().scale() > PRICE_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge);
        }

        let mut amount = amount;
        amount.rescale(PRICE_SCALE);
        Ok(Self(amount))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_is_rescaled_to_cents() {
        let price: Price = "100".parse().unwrap();
        assert_eq!(price.to_string(), "100.00");

        let price: Price = "19.9".parse().unwrap();
        assert_eq!(price.to_string(), "19.90");
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let price: Price = "5.500".parse().unwrap();
        assert_eq!(price.to_string(), "5.50");
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!("0".parse::<Price>(), Err(PriceError::NotPositive));
        assert_eq!("-3.50".parse::<Price>(), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_rejects_sub_cent_amounts() {
        assert_eq!("1.005".parse::<Price>(), Err(PriceError::TooPrecise));
    }

    #[test]
    fn test_rejects_values_beyond_column() {
        assert!("99999999.99".parse::<Price>().is_ok());
        assert_eq!("100000000".parse::<Price>(), Err(PriceError::TooLarge));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!("abc".parse::<Price>(), Err(PriceError::Invalid));
    }

    #[test]
    fn test_serializes_as_string() {
        let price: Price = "250".parse().unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"250.00\"");
    }

    #[test]
    fn test_deserializes_from_string_or_number() {
        let from_str: Price = serde_json::from_str("\"42.50\"").unwrap();
        let from_int: Price = serde_json::from_str("42").unwrap();
        assert_eq!(from_str.to_string(), "42.50");
        assert_eq!(from_int.to_string(), "42.00");

        assert!(serde_json::from_str::<Price>("0").is_err());
    }
}
