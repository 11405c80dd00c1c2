//! Secure token route and controller registry.
//!
//! # Responsibilities
//! - Map controller names to constructor functions
//! - Serve `/tk/{token}`: decode the token, pick the controller named by
//!   `act`, merge the token parameters into the request, invoke it
//!
//! # Design Decisions
//! - Controllers are only reachable through names registered at startup
//! - Undecodable tokens, a missing `act` and unknown controllers all
//!   answer 404 so a probe learns nothing about which check failed
//! - Parameters already on the request take precedence over token ones

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AlphaError, AlphaResult};
use crate::http::{Request, Response};
use crate::routing::Handler;
use crate::security::SecurityCodec;

/// Pattern of the secure token route.
pub const TOKEN_ROUTE: &str = "/tk/{token}";

/// Builds a fresh controller instance.
pub type ControllerFactory = Box<dyn Fn() -> Box<dyn Handler> + Send + Sync>;

/// Named controller constructors.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Handler> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(controller = %name, "Controller registered");
        self.factories.insert(name, Box::new(factory));
    }

    /// Register a controller type built with `Default`.
    pub fn register_default<H>(&mut self, name: impl Into<String>)
    where
        H: Handler + Default + 'static,
    {
        self.register(name, || Box::new(H::default()) as Box<dyn Handler>);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct the controller registered under `name`.
    pub fn create(&self, name: &str) -> AlphaResult<Box<dyn Handler>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| AlphaError::UnknownController(name.to_string()))
    }
}

/// Handler behind [`TOKEN_ROUTE`].
pub struct TokenHandler {
    codec: Arc<SecurityCodec>,
    controllers: Arc<ControllerRegistry>,
}

impl TokenHandler {
    pub fn new(codec: Arc<SecurityCodec>, controllers: Arc<ControllerRegistry>) -> Self {
        Self { codec, controllers }
    }
}

impl Handler for TokenHandler {
    fn handle(&self, request: &Request) -> AlphaResult<Response> {
        let token = request.param("token").ok_or_else(AlphaError::not_found)?;

        let params = match self.codec.decode_query_params(token) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "Undecodable token provided on a /tk/ request");
                return Err(AlphaError::not_found());
            }
        };

        let Some(act) = params.get("act") else {
            tracing::warn!(params = ?params, "Bad params provided on a /tk/ request");
            return Err(AlphaError::not_found());
        };

        let controller = match self.controllers.create(act) {
            Ok(controller) => controller,
            Err(e) => {
                tracing::warn!(error = %e, "Token names an unknown controller");
                return Err(AlphaError::not_found());
            }
        };

        tracing::debug!(controller = %act, "Dispatching secure token");
        let mut forwarded = request.clone();
        forwarded.merge_missing_params(params);
        controller.handle(&forwarded)
    }
}
