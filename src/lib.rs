//! Alpha front controller library.
//!
//! Routes every request through one entry point: the URI is matched
//! against registered patterns, placeholders and defaults are bound as
//! parameters, security filters run, and the matched handler produces the
//! response. Secure URLs carry an encrypted query string that names a
//! controller and its parameters.

pub mod config;
pub mod controllers;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::AlphaConfig;
pub use dispatch::{FrontController, FrontControllerBuilder};
pub use error::{AlphaError, AlphaResult};
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::Handler;
