//! Type-safe, non-negative price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices cannot be negative.
    #[error("price cannot be negative")]
    Negative,
    /// More than two decimal places.
    #[error("price can have at most 2 decimal places")]
    TooPrecise,
    /// Above the largest price the store can record.
    #[error("price is too large")]
    Overflow,
}

/// A unit or total price in the store currency.
///
/// Serialized as a JSON number so browser clients can do arithmetic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest amount a price column holds (`NUMERIC(12, 2)`).
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_327, 232, 0, false, 2));

    /// Decimal places kept for a price.
    pub const SCALE: u32 = 2;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero,
    /// `PriceError::TooPrecise` for fractions of a cent and
    /// `PriceError::Overflow` above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let amount = amount.normalize();
        if amount.scale() > Self::SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::Overflow);
        }
        Ok(Self(amount))
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Total for `quantity` units at this unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total is above [`Price::MAX`].
    pub fn times(self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .ok_or(PriceError::Overflow)
            .and_then(Self::new)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
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
    fn test_negative_rejected() {
        assert_eq!(Price::new(Decimal::new(-1, 0)), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times() {
        let unit = Price::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(unit.times(3).unwrap().amount(), Decimal::new(15, 0));
    }

    #[test]
    fn test_json_number() {
        let price = Price::new(Decimal::new(1250, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "12.5");

        let parsed: Price = serde_json::from_str("12.5").unwrap();
        assert_eq!(parsed, price);
        assert!(serde_json::from_str::<Price>("-2").is_err());

        let whole: Price = serde_json::from_str("15").unwrap();
        assert_eq!(whole.amount(), Decimal::new(15, 0));
    }

    #[test]
    fn test_sub_cent_rejected() {
        assert_eq!(
            Price::new(Decimal::new(12_345, 3)),
            Err(PriceError::TooPrecise)
        );
        assert!(serde_json::from_str::<Price>("12.345").is_err());
        // Trailing zeros are not extra precision
        let price = Price::new(Decimal::new(12_500, 3)).unwrap();
        assert_eq!(price.amount(), Decimal::new(125, 1));
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(
            Price::MAX.amount(),
            Decimal::from_str_exact("9999999999.99").unwrap()
        );
        assert!(Price::new(Price::MAX.amount()).is_ok());
        assert_eq!(
            Price::new(Decimal::new(100_000_000_000, 0)),
            Err(PriceError::Overflow)
        );
        assert!(serde_json::from_str::<Price>("100000000000").is_err());
    }

    #[test]
    fn test_total_above_max_overflows() {
        let unit = Price::new(Decimal::new(1_000_000_000, 0)).unwrap();
        assert!(unit.times(9).is_ok());
        assert_eq!(unit.times(20), Err(PriceError::Overflow));
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(15, 0)).unwrap();
        assert_eq!(price.to_string(), "$15.00");
    }
}
