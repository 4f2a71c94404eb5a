//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Error returned for a lifecycle move the order cannot make.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct StatusTransitionError {
    /// Current status.
    pub from: OrderStatus,
    /// Requested status.
    pub to: OrderStatus,
}

/// Order status.
///
/// `Pending -> Shipped -> Delivered`. `Delivered` is terminal; cancellation
/// removes the order instead of moving it to `Cancelled`, which is kept for
/// rows written by older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "plantnet.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether an order in this status may still be deleted (cancelled).
    #[must_use]
    pub const fn is_deletable(self) -> bool {
        match self {
            Self::Pending | Self::Shipped | Self::Cancelled => true,
            Self::Delivered => false,
        }
    }

    /// Validate a fulfilment move to `next`.
    ///
    /// # Errors
    ///
    /// Returns `StatusTransitionError` unless the move is `Pending -> Shipped`
    /// or `Shipped -> Delivered`.
    pub const fn transition_to(self, next: Self) -> Result<Self, StatusTransitionError> {
        match (self, next) {
            (Self::Pending, Self::Shipped) | (Self::Shipped, Self::Delivered) => Ok(next),
            _ => Err(StatusTransitionError {
                from: self,
                to: next,
            }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_delivered_is_undeletable() {
        assert!(OrderStatus::Pending.is_deletable());
        assert!(OrderStatus::Shipped.is_deletable());
        assert!(OrderStatus::Cancelled.is_deletable());
        assert!(!OrderStatus::Delivered.is_deletable());
    }

    #[test]
    fn test_forward_transitions() {
        assert_eq!(
            OrderStatus::Pending.transition_to(OrderStatus::Shipped),
            Ok(OrderStatus::Shipped)
        );
        assert_eq!(
            OrderStatus::Shipped.transition_to(OrderStatus::Delivered),
            Ok(OrderStatus::Delivered)
        );
    }

    #[test]
    fn test_rejected_transitions() {
        let delivered_back = OrderStatus::Delivered
            .transition_to(OrderStatus::Pending)
            .unwrap_err();
        assert_eq!(
            delivered_back.to_string(),
            "cannot move order from delivered to pending"
        );
        assert!(
            OrderStatus::Pending
                .transition_to(OrderStatus::Delivered)
                .is_err()
        );
        assert!(
            OrderStatus::Pending
                .transition_to(OrderStatus::Cancelled)
                .is_err()
        );
    }

    #[test]
    fn test_default_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
