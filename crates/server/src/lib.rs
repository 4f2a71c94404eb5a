//! `PlantNet` storefront API library.
//!
//! The binary in `main.rs` wires these modules into an axum server; keeping
//! them in a library lets the router be exercised from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
