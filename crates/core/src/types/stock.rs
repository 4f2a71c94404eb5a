//! Signed stock adjustments.
//!
//! Plant quantity is only ever changed by a relative adjustment, never
//! overwritten, and a decrease may not take it below zero.

use serde::{Deserialize, Serialize};

/// Errors raised by stock adjustments.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    /// Adjustment amount must be at least one unit.
    #[error("quantity must be at least 1")]
    ZeroAmount,
    /// Adjustment amount does not fit the stock column.
    #[error("quantity is too large")]
    TooLarge,
    /// The decrease would drive stock below zero.
    #[error("Quantity exceeds available stock")]
    Insufficient {
        /// Units on hand.
        available: i32,
        /// Units requested.
        requested: u32,
    },
}

/// Direction of a stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockDirection {
    Increase,
    /// Purchases decrease stock; this is the default when no direction is sent.
    #[default]
    Decrease,
}

/// A validated, non-zero stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    amount: u32,
    direction: StockDirection,
}

impl StockAdjustment {
    /// Build an adjustment of `amount` units.
    ///
    /// # Errors
    ///
    /// Returns `StockError::ZeroAmount` for amounts below one and
    /// `StockError::TooLarge` for amounts beyond `i32::MAX`.
    pub fn new(amount: i64, direction: StockDirection) -> Result<Self, StockError> {
        if amount < 1 {
            return Err(StockError::ZeroAmount);
        }
        let amount = i32::try_from(amount).map_err(|_| StockError::TooLarge)?;
        Ok(Self {
            amount: amount.unsigned_abs(),
            direction,
        })
    }

    /// Units to add or remove.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Signed change to apply to the quantity column.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // amount was built from a positive i32
    pub const fn delta(&self) -> i32 {
        match self.direction {
            StockDirection::Increase => self.amount as i32,
            StockDirection::Decrease => -(self.amount as i32),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_must_be_positive() {
        assert_eq!(
            StockAdjustment::new(0, StockDirection::Decrease),
            Err(StockError::ZeroAmount)
        );
        assert_eq!(
            StockAdjustment::new(-4, StockDirection::Increase),
            Err(StockError::ZeroAmount)
        );
        assert_eq!(
            StockAdjustment::new(i64::from(i32::MAX) + 1, StockDirection::Increase),
            Err(StockError::TooLarge)
        );
    }

    #[test]
    fn test_delta_sign() {
        let up = StockAdjustment::new(4, StockDirection::Increase).unwrap();
        let down = StockAdjustment::new(4, StockDirection::Decrease).unwrap();
        assert_eq!(up.delta(), 4);
        assert_eq!(down.delta(), -4);

        let largest = StockAdjustment::new(i64::from(i32::MAX), StockDirection::Decrease).unwrap();
        assert_eq!(largest.delta(), -i32::MAX);
    }

    #[test]
    fn test_default_direction_is_decrease() {
        let direction: StockDirection = serde_json::from_str("\"decrease\"").unwrap();
        assert_eq!(direction, StockDirection::default());
    }
}
