//! Route table and registration.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Index patterns for O(1) exact lookup
//! - Attach per-placeholder default values
//! - Resolve a URI to its route (see `matcher.rs`)
//!
//! # Design Decisions
//! - Built once during setup, then shared immutably behind an `Arc`
//! - Registration order is the tie-break for the fallback phases
//! - Defaults are not checked against the pattern; unused ones are inert

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::AlphaResult;
use crate::http::{Request, Response};
use crate::routing::matcher::{self, RouteMatch, RouteNotFound};
use crate::routing::pattern::RoutePattern;

/// Something that turns a request into a response.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> AlphaResult<Response>;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> AlphaResult<Response> + Send + Sync,
{
    fn handle(&self, request: &Request) -> AlphaResult<Response> {
        self(request)
    }
}

/// A registered pattern with its handler and default parameter values.
pub struct Route {
    pattern: RoutePattern,
    handler: Arc<dyn Handler>,
    /// `None` registers the name without a value (a null default).
    defaults: BTreeMap<String, Option<String>>,
}

impl Route {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn compiled(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn defaults(&self) -> &BTreeMap<String, Option<String>> {
        &self.defaults
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Chains default values onto the route that was just added.
pub struct RouteBuilder<'a> {
    route: &'a mut Route,
}

impl RouteBuilder<'_> {
    pub fn with_default(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route.defaults.insert(name.into(), Some(value.into()));
        self
    }

    /// Register a default that leaves the parameter unset.
    pub fn with_null_default(self, name: impl Into<String>) -> Self {
        self.route.defaults.insert(name.into(), None);
        self
    }
}

/// Ordered collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure or function as the handler for `pattern`.
    ///
    /// Registering the same pattern twice replaces the earlier handler and
    /// defaults but keeps its position.
    pub fn add_route<F>(&mut self, pattern: &str, handler: F) -> AlphaResult<RouteBuilder<'_>>
    where
        F: Fn(&Request) -> AlphaResult<Response> + Send + Sync + 'static,
    {
        self.add_handler(pattern, Arc::new(handler))
    }

    /// Register a shared [`Handler`] for `pattern`.
    pub fn add_handler(
        &mut self,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> AlphaResult<RouteBuilder<'_>> {
        let compiled = RoutePattern::parse(pattern)?;
        let route = Route {
            pattern: compiled,
            handler,
            defaults: BTreeMap::new(),
        };

        let existing = self.index.get(pattern).copied();
        let position = match existing {
            Some(position) => {
                tracing::debug!(pattern = %pattern, "Replacing existing route");
                self.routes[position] = route;
                position
            }
            None => {
                let position = self.routes.len();
                tracing::debug!(pattern = %pattern, position, "Route registered");
                self.routes.push(route);
                self.index.insert(pattern.to_string(), position);
                position
            }
        };

        Ok(RouteBuilder {
            route: &mut self.routes[position],
        })
    }

    /// Route registered under exactly this pattern string.
    pub fn get(&self, pattern: &str) -> Option<&Route> {
        self.index.get(pattern).map(|&i| &self.routes[i])
    }

    /// Routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a request URI to a route.
    pub fn resolve(&self, uri: &str) -> Result<RouteMatch<'_>, RouteNotFound> {
        matcher::resolve(self, uri)
    }
}
