//! Error types for the navscore library.
//!
//! Recommendation requests never fail: a scorer that hits a problem degrades
//! to an empty candidate list and the combiner labels the result accordingly.
//! The errors below are reserved for the setup side of the crate, such as
//! loading a feature catalog or validating a configuration.
//!
//! # Examples
//!
//! ```
//! use navscore::error::{NavScoreError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(NavScoreError::config("collaborative weight must be in [0, 1]"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for navscore operations.
#[derive(Error, Debug)]
pub enum NavScoreError {
    /// I/O errors (catalog files, interaction logs)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or inconsistent feature catalog
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// An upstream collaborator (feature loader, profile source) failed
    #[error("Source error: {0}")]
    Source(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with NavScoreError.
pub type Result<T> = std::result::Result<T, NavScoreError>;

impl NavScoreError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        NavScoreError::Config(msg.into())
    }

    /// Create a new catalog error.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        NavScoreError::Catalog(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        NavScoreError::Other(format!("Invalid argument: {}", msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = NavScoreError::config("bad weight");
        assert_eq!(error.to_string(), "Configuration error: bad weight");

        let error = NavScoreError::catalog("duplicate path /revenue");
        assert_eq!(error.to_string(), "Catalog error: duplicate path /revenue");

        let error = NavScoreError::invalid_argument("empty user id");
        assert!(matches!(error, NavScoreError::Other(_)));
        assert_eq!(error.to_string(), "Error: Invalid argument: empty user id");

        let error = NavScoreError::Source("profile service unavailable".to_string());
        assert_eq!(error.to_string(), "Source error: profile service unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = NavScoreError::from(io_error);

        match error {
            NavScoreError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
