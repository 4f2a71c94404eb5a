//! Core types for PlantNet.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod access;
pub mod email;
pub mod id;
pub mod price;
pub mod purchase;
pub mod role;
pub mod status;
pub mod stock;

pub use access::AccessPolicy;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use purchase::{PurchaseError, PurchaseQuantity};
pub use role::{Role, SellerStatus};
pub use status::{OrderStatus, StatusTransitionError};
pub use stock::{StockAdjustment, StockDirection, StockError};
