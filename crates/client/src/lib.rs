//! `PlantNet` client library.
//!
//! The browser-side half of the storefront, expressed as a typed library:
//!
//! - [`PlantNetClient`] - cookie-carrying HTTP client for every API endpoint
//! - [`purchase`] - the purchase flow: local quantity check, one request, redirect
//! - [`guard`] - dashboard route guards driven by the stored role
//! - [`images`] - third-party image hosting for plant and profile pictures
//!
//! All wire types come from [`plantnet_core`], so client and server agree on
//! field names by construction.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod error;
pub mod guard;
pub mod images;
pub mod purchase;

pub use api::PlantNetClient;
pub use error::ClientError;
pub use guard::{GuardDecision, RoleState, RouteGuard};
pub use images::{ImageHost, ImgbbUploader};
pub use purchase::{PurchaseFailure, PurchaseOutcome};
