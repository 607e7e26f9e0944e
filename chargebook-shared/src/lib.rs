//! # ChargeBook Shared Library
//!
//! This crate contains the types, database layer, and business logic shared
//! by the ChargeBook API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migration runner
//! - `services`: Booking and administration services (the core domain logic)

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the ChargeBook shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
