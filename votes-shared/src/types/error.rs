use thiserror::Error;

/// Errors raised while constructing shared domain values from untrusted input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Empty identifier: {0}")]
    EmptyIdentifier(&'static str),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}
