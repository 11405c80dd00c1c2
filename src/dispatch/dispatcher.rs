//! Request dispatch.
//!
//! # Responsibilities
//! - Resolve the request URI to a route
//! - Bind captured values and defaults onto the request
//! - Run the filter chain
//! - Invoke the handler and enforce the response contract
//!
//! # Design Decisions
//! - A routing miss surfaces only as `ResourceNotFound`
//! - Filters run after matching and before the handler; a rejection means
//!   the handler never runs
//! - A handler's `ResourceNotFound` becomes a 404 response, other handler
//!   errors propagate unchanged
//! - Malformed responses are a server error, never coerced

use crate::error::{AlphaError, AlphaResult};
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::security::FilterChain;

/// Routes requests to handlers through the filter chain.
#[derive(Debug)]
pub struct Dispatcher {
    routes: RouteTable,
    filters: FilterChain,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, filters: FilterChain) -> Self {
        Self { routes, filters }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    /// Dispatch a request to its handler.
    pub fn process(&self, mut request: Request) -> AlphaResult<Response> {
        let matched = self.routes.resolve(request.uri()).map_err(|e| {
            tracing::debug!(error = %e, "Routing miss");
            metrics::record_route_miss();
            AlphaError::not_found()
        })?;

        matched.bind(&mut request);
        self.filters.run_all(&request)?;

        let response = match matched.route().handler().handle(&request) {
            Ok(response) => response,
            Err(AlphaError::ResourceNotFound(message)) => {
                tracing::debug!(
                    uri = %request.uri(),
                    pattern = %matched.pattern(),
                    message = %message,
                    "Handler reported resource not found"
                );
                Response::text(404, message)
            }
            Err(e) => return Err(e),
        };

        if !response.is_well_formed() {
            tracing::error!(
                uri = %request.uri(),
                pattern = %matched.pattern(),
                status = response.status(),
                "Handler returned a malformed response"
            );
            return Err(AlphaError::Dispatch);
        }

        Ok(response)
    }
}
