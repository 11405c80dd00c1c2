//! Built-in controllers.
//!
//! # Responsibilities
//! - Serve the index (`/`) and health (`/health`) routes
//! - Provide `Status` and `Echo`, reachable through secure tokens
//! - Register all of the above on a builder in one call

use serde::Serialize;

use crate::dispatch::FrontControllerBuilder;
use crate::error::{AlphaError, AlphaResult};
use crate::http::{Request, Response};
use crate::routing::Handler;

#[derive(Serialize)]
pub struct SystemStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

impl SystemStatus {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            status: "operational",
        }
    }
}

fn status_response() -> AlphaResult<Response> {
    let body = serde_json::to_value(SystemStatus::current())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to serialize status");
            AlphaError::Dispatch
        })?;
    Ok(Response::json(200, &body))
}

pub fn index(_request: &Request) -> AlphaResult<Response> {
    Ok(Response::ok("Alpha front controller"))
}

pub fn health(_request: &Request) -> AlphaResult<Response> {
    status_response()
}

/// Reports service status. Token target `act=Status`.
#[derive(Debug, Default)]
pub struct StatusController;

impl Handler for StatusController {
    fn handle(&self, _request: &Request) -> AlphaResult<Response> {
        status_response()
    }
}

/// Echoes the `message` parameter. Token target `act=Echo`, also mounted
/// at `/echo/{message}`.
#[derive(Debug, Default)]
pub struct EchoController;

impl Handler for EchoController {
    fn handle(&self, request: &Request) -> AlphaResult<Response> {
        match request.param("message") {
            Some(message) if !message.is_empty() => Ok(Response::ok(message)),
            _ => Err(AlphaError::ResourceNotFound("Nothing to echo".into())),
        }
    }
}

/// Register the built-in routes and controllers.
pub fn register_defaults(builder: &mut FrontControllerBuilder) -> AlphaResult<()> {
    builder.add_route("/", index)?;
    builder.add_route("/health", health)?;
    builder
        .add_route("/echo/{message}", |req: &Request| EchoController.handle(req))?
        .with_default("message", "hello");

    builder
        .register_default_controller::<StatusController>("Status")
        .register_default_controller::<EchoController>("Echo");
    Ok(())
}
