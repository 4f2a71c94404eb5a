//! Business logic services for the server.
//!
//! # Services
//!
//! - `auth` - Token issuance and verification, and the `token` cookie
pub mod auth;
