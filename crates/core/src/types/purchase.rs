//! Purchase quantity rules shared by the purchase form and the server.

use serde::Serialize;

use super::price::{Price, PriceError};

/// Reasons a requested purchase quantity is refused.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    /// Fewer than one unit requested.
    #[error("Quantity can not be less then 1")]
    BelowMinimum,
    /// More units requested than are in stock.
    #[error("Quantity exceeds available stock")]
    ExceedsStock {
        /// Units on hand.
        available: i32,
    },
}

/// A purchase quantity known to be in `[1, available]` when it was checked.
///
/// Stock can still move between the check and the order; the server re-checks
/// atomically when it decrements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PurchaseQuantity(u32);

impl PurchaseQuantity {
    /// Check `requested` against the `available` stock.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::BelowMinimum` below one unit and
    /// `PurchaseError::ExceedsStock` above `available`.
    pub fn validate(requested: i64, available: i32) -> Result<Self, PurchaseError> {
        if requested < 1 {
            return Err(PurchaseError::BelowMinimum);
        }
        if requested > i64::from(available) {
            return Err(PurchaseError::ExceedsStock { available });
        }
        // requested is within [1, i32::MAX] here
        u32::try_from(requested)
            .map(Self)
            .map_err(|_| PurchaseError::ExceedsStock { available })
    }

    /// Number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Total price of this many units at `unit_price`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the total does not fit.
    pub fn total(self, unit_price: Price) -> Result<Price, PriceError> {
        unit_price.times(self.0)
    }
}
