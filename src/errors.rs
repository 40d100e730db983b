//! Error types for ColorTask.
//!
//! Most failures in this application are recovered locally (corrupt storage loads
//! as an empty list, unknown ids are no-ops), so this enum only carries the
//! cases that callers need to see.

use std::io;

use thiserror::Error;

use crate::task::FieldErrors;

/// The main error type for the colortask application.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Errors related to reading or writing the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A draft failed field-level validation and was not committed.
    #[error("Invalid task: {errors}")]
    Validation { errors: FieldErrors },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Terminal setup or teardown failed.
    #[error("Terminal error: {message}")]
    Terminal { message: String },
}

/// A specialized Result type for colortask operations.
pub type Result<T> = std::result::Result<T, TaskError>;
