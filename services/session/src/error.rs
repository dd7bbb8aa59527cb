//! Error types for the Upkeep API client

use thiserror::Error;

/// Errors surfaced by API calls
///
/// Authentication and tenant problems are the only failures the UI layer is
/// expected to act on; everything else is reported as-is to the caller.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The credential was missing, invalid or expired; the user must
    /// re-authenticate
    #[error("Authentication required")]
    Unauthorized,

    /// The active organization was rejected by the server; the user must
    /// re-select one
    #[error("Active organization rejected by the server")]
    TenantRejected,

    /// Any other non-success response status
    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(u16),

    /// Transport-level failure (connection, timeout, decoding)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;
