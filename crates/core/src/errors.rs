//! Core error types for the farmflow application.
//!
//! These cover recoverable validation of user-entered form data. Contract
//! violations in the entry synchronizer (an index out of range, an unknown
//! correlation id) panic instead of returning an error.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the farmflow application.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for user-entered form data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}
