//! Votes API Library
//!
//! This library provides the HTTP surface of the vote ledger, including
//! configuration management, error handling, dependency wiring and routing.
//!
//! ## Modules
//!
//! - [`config`]: Environment configuration and dependency initialization
//! - [`errors`]: Error types for service startup and execution
//! - [`server`]: Axum router, handlers and error-to-response mapping

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Config, Dependencies};
pub use errors::ServiceError;
