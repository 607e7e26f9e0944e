//! # ChargeBook API Server Library
//!
//! This library provides the core functionality for the ChargeBook API
//! server: a REST API for booking charging slots at EV stations.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
