//! Common error types.
//!
//! Errors raised before or during a call are converted to synthetic
//! `status: -1` result sets at the connection boundary; they never cross the
//! public facade as panics or raw transport errors.

use thiserror::Error;

/// Application error type shared by all crates in the workspace.
#[derive(Debug, Error)]
pub enum AppError {
    /// The procedure name is not in the connection's signature table.
    #[error("Procedure \"{0}\" is undefined.")]
    UnknownProcedure(String),

    /// No signature variant matches the supplied parameter count.
    /// `expected` enumerates every valid arity for the procedure.
    #[error("Invalid parameter count for procedure \"{procedure}\" (received: {received}, expected: {expected})")]
    ArityMismatch {
        procedure: String,
        received: usize,
        expected: String,
    },

    /// A short API call was issued without an API path.
    #[error("Error: Please specify apiPath.")]
    MissingApiPath,

    /// A short API update call was issued without a request body.
    #[error("Error: Please specify parameters")]
    MissingApiBody,

    /// Network failure, non-2xx response, or malformed response body.
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid user-supplied configuration.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Convenience result alias.
pub type AppResult<T> = Result<T, AppError>;
