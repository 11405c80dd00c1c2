//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → request.rs (plain request value handed to the front controller)
//!     → dispatch (route, filter, handler)
//!     → response.rs (handler result, converted back for axum)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::Request;
pub use response::Response;
pub use server::{AppState, HttpServer};
