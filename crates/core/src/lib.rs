//! PlantNet Core - Shared types library.
//!
//! This crate provides the domain types used across all PlantNet components:
//! - `server` - REST API over the plant, user and order tables
//! - `client` - Typed API client, purchase flow and dashboard route guards
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and rules - no I/O, no database access,
//! no HTTP clients. Access-control and stock rules live here so the server and
//! the client make the same decisions.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles, statuses,
//!   stock adjustments and purchase quantities
//! - [`models`] - JSON shapes of users, plants and orders as the API sends
//!   and receives them

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use types::*;
