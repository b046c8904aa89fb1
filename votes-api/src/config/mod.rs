//! Configuration module for the Votes API.
//! Defines and manages application-wide settings and dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{Config, LogFormat, StoreBackend};
