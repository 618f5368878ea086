//! Error handling for soil moisture quality control runs.
//!
//! Provides error types with context for schema validation and
//! run configuration failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlagitError {
    #[error("schema error: {reason}")]
    Schema { reason: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl FlagitError {
    /// Create a schema error with context
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }

    /// Create a configuration error with context
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlagitError>;
