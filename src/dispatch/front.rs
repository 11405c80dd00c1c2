//! Front controller assembly.
//!
//! # Responsibilities
//! - Collect routes, filters and controllers during setup
//! - Install the secure token route
//! - Freeze everything into an immutable `FrontController`
//! - Generate and decode secure URLs for view collaborators
//!
//! # Design Decisions
//! - The token route is registered first, like any built-in route, so
//!   application routes cannot shadow it in the fallback phases
//! - Configuration is passed in explicitly and shared by `Arc`

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::AlphaConfig;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::token::{ControllerRegistry, TokenHandler, TOKEN_ROUTE};
use crate::error::{AlphaError, AlphaResult};
use crate::http::{Request, Response};
use crate::routing::{Handler, RouteBuilder, RouteTable};
use crate::security::{Filter, FilterChain, FilterRegistry, FilterStores, SecurityCodec};

/// Mutable setup phase of the front controller.
pub struct FrontControllerBuilder {
    config: Arc<AlphaConfig>,
    codec: Arc<SecurityCodec>,
    routes: RouteTable,
    filters: FilterChain,
    controllers: ControllerRegistry,
}

impl FrontControllerBuilder {
    pub fn new(config: Arc<AlphaConfig>) -> AlphaResult<Self> {
        let codec = Arc::new(SecurityCodec::new(&config.security.encryption_key));
        let mut routes = RouteTable::new();
        // Reserves the first position; build() installs the real handler.
        routes.add_route(TOKEN_ROUTE, |_req: &Request| Err(AlphaError::not_found()))?;

        Ok(Self {
            config,
            codec,
            routes,
            filters: FilterChain::new(),
            controllers: ControllerRegistry::new(),
        })
    }

    pub fn add_route<F>(&mut self, pattern: &str, handler: F) -> AlphaResult<RouteBuilder<'_>>
    where
        F: Fn(&Request) -> AlphaResult<Response> + Send + Sync + 'static,
    {
        self.routes.add_route(pattern, handler)
    }

    pub fn add_handler(&mut self, pattern: &str, handler: Arc<dyn Handler>) -> AlphaResult<RouteBuilder<'_>> {
        self.routes.add_handler(pattern, handler)
    }

    pub fn register_filter(&mut self, filter: Arc<dyn Filter>) -> &mut Self {
        self.filters.register(filter);
        self
    }

    /// Append the filters named in the configuration.
    pub fn configure_filters(
        &mut self,
        registry: &FilterRegistry,
        stores: &FilterStores,
    ) -> AlphaResult<&mut Self> {
        let chain = registry.build_chain(&self.config.filters, stores)?;
        self.filters.extend(chain);
        Ok(self)
    }

    /// Make a controller reachable through secure tokens.
    pub fn register_controller<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Handler> + Send + Sync + 'static,
    {
        self.controllers.register(name, factory);
        self
    }

    pub fn register_default_controller<H>(&mut self, name: impl Into<String>) -> &mut Self
    where
        H: Handler + Default + 'static,
    {
        self.controllers.register_default::<H>(name);
        self
    }

    /// Freeze the setup into a front controller.
    pub fn build(mut self) -> AlphaResult<FrontController> {
        let controllers = Arc::new(self.controllers);
        let token_handler = TokenHandler::new(self.codec.clone(), controllers.clone());
        self.routes.add_handler(TOKEN_ROUTE, Arc::new(token_handler))?;

        tracing::info!(
            routes = self.routes.len(),
            filters = ?self.filters.names(),
            controllers = ?controllers.names(),
            "Front controller ready"
        );

        Ok(FrontController {
            dispatcher: Dispatcher::new(self.routes, self.filters),
            codec: self.codec,
            config: self.config,
        })
    }
}

/// Immutable request entry point shared by all workers.
#[derive(Debug)]
pub struct FrontController {
    dispatcher: Dispatcher,
    codec: Arc<SecurityCodec>,
    config: Arc<AlphaConfig>,
}

impl FrontController {
    pub fn builder(config: Arc<AlphaConfig>) -> AlphaResult<FrontControllerBuilder> {
        FrontControllerBuilder::new(config)
    }

    /// Dispatch a request. A query-style token (`/?tk=...`) is routed
    /// through the token route.
    pub fn process(&self, mut request: Request) -> AlphaResult<Response> {
        if request.uri() == "/" {
            if let Some(token) = request.param("tk") {
                let uri = format!("/tk/{token}");
                request.set_uri(uri);
            }
        }
        self.dispatcher.process(request)
    }

    /// Secure URL for `params` in the configured routing style.
    pub fn generate_secure_url(&self, params: &str) -> String {
        self.codec
            .build_secure_url(&self.config.app.url, self.config.app.url_style(), params)
    }

    pub fn encode_query(&self, query: &str) -> String {
        self.codec.encode(query)
    }

    pub fn decode_query_params(&self, token: &str) -> AlphaResult<BTreeMap<String, String>> {
        Ok(self.codec.decode_query_params(token)?)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &AlphaConfig {
        &self.config
    }
}
