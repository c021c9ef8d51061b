//! Error types for the todo API client.
//!
//! The server answers validation failures with 400 and unknown ids with 404,
//! both with a plain-text message. Those two get their own variants carrying
//! that message; every other unexpected status lands in `HttpError`.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: the server rejected the input (blank title, bad id, no body).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// 404: no todo with the requested id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other status the call did not expect.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
