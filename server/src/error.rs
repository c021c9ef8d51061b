//! Error taxonomy for the todo store and its HTTP surface.
//!
//! # Design
//! `Validation`, `NotFound` and `TooLarge` carry a human-readable message
//! that is sent back to the caller verbatim as a plain-text body. `Internal` carries a
//! detail string that is only ever logged; the response is a bare 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const TITLE_REQUIRED: &str = "Error: Title is required";
pub const TITLE_BLANK: &str = "Error: Title cannot be blank";
pub const NOT_FOUND: &str = "Error: Element not found";
pub const ID_REQUIRED: &str = "Error: Id is required";
pub const ID_INVALID: &str = "Error: Invalid id";
pub const BODY_REQUIRED: &str = "Error: Request body is required";
pub const BODY_INVALID: &str = "Error: Invalid request body";
pub const BODY_TOO_LARGE: &str = "Error: Request body is too large";

/// Errors raised by `TodoStore` operations and the request handlers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TodoError {
    /// Malformed or blank input. Maps to 400.
    #[error("{0}")]
    Validation(String),

    /// No todo with the requested id. Maps to 404.
    #[error("{0}")]
    NotFound(String),

    /// Request body over the size limit. Maps to 413.
    #[error("{0}")]
    TooLarge(String),

    /// Anything else. Maps to 500 with no body.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TodoError {
    pub fn validation(message: &str) -> Self {
        TodoError::Validation(message.to_string())
    }

    pub fn not_found() -> Self {
        TodoError::NotFound(NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TodoError::Validation(_) => StatusCode::BAD_REQUEST,
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            TodoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            TodoError::Validation(message)
            | TodoError::NotFound(message)
            | TodoError::TooLarge(message) => {
                log::warn!("{} {}", status.as_u16(), message);
                (status, message).into_response()
            }
            TodoError::Internal(detail) => {
                log::error!("internal failure: {detail}");
                status.into_response()
            }
        }
    }
}
