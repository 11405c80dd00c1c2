//! Error taxonomy for routing and dispatch.
//!
//! # Design Decisions
//! - The core classifies failures; presentation (status codes, error pages)
//!   belongs to the HTTP boundary
//! - `RouteNotFound` stays inside `routing`; callers only ever see
//!   `ResourceNotFound`

use thiserror::Error;

use crate::security::codec::SecurityError;

/// Message carried by not-found errors raised by the dispatcher.
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

/// Errors surfaced by the front controller.
#[derive(Debug, Error)]
pub enum AlphaError {
    /// No route matched, or a handler could not find a sub-resource (404).
    #[error("{0}")]
    ResourceNotFound(String),

    /// A filter blocked the request (403).
    #[error("{0}")]
    ResourceNotAllowed(String),

    /// Route registration was given an unusable pattern.
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// A handler broke the response contract.
    #[error("Unable to process request")]
    Dispatch,

    /// No controller is registered under the requested name.
    #[error("Unknown controller [{0}]")]
    UnknownController(String),

    /// No filter is registered under the configured name.
    #[error("Unknown filter [{0}]")]
    UnknownFilter(String),

    /// Secure token could not be encoded or decoded.
    #[error(transparent)]
    Security(#[from] SecurityError),
}

impl AlphaError {
    /// The canonical "Resource not found" error.
    pub fn not_found() -> Self {
        AlphaError::ResourceNotFound(NOT_FOUND_MESSAGE.to_string())
    }

    /// HTTP status code the boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            AlphaError::ResourceNotFound(_) => 404,
            AlphaError::ResourceNotAllowed(_) => 403,
            _ => 500,
        }
    }
}

/// Result type for front controller operations.
pub type AlphaResult<T> = Result<T, AlphaError>;
