//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the client core.

use thiserror::Error;

/// Custom error type for local storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred while reading or writing the backing file
    #[error("Storage I/O error: {0}")]
    Io(#[source] std::io::Error),

    /// Error occurred while encoding or decoding the storage snapshot
    #[error("Storage serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;
