//! Route matching logic.
//!
//! # Responsibilities
//! - Resolve a URI to a registered route in three phases
//! - Record which route and phase matched (the current route state)
//! - Bind captured values and defaults onto the request
//!
//! # Design Decisions
//! - Phase 1: exact pattern string, O(1) hash lookup
//! - Phase 2: every placeholder filled, first registered wins
//! - Phase 3: placeholder segments may be omitted, first registered wins
//! - Each phase returns `Option`; phases compose with `or_else`
//! - No specificity ranking: registration order is the only tie-break

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::http::Request;
use crate::routing::router::{Route, RouteTable};

/// No registered pattern matched the URI in any phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No route available to match the URI [{uri}]")]
pub struct RouteNotFound {
    pub uri: String,
}

/// The phase that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Exact,
    Strict,
    Defaulted,
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPhase::Exact => "exact",
            MatchPhase::Strict => "strict",
            MatchPhase::Defaulted => "defaulted",
        };
        f.write_str(name)
    }
}

/// The route matched for the current request.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    route: &'a Route,
    phase: MatchPhase,
    uri: String,
    captured: BTreeMap<String, String>,
}

impl<'a> RouteMatch<'a> {
    pub fn route(&self) -> &'a Route {
        self.route
    }

    pub fn pattern(&self) -> &'a str {
        self.route.pattern()
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Placeholder values taken from the URI.
    pub fn captured(&self) -> &BTreeMap<String, String> {
        &self.captured
    }

    /// Placeholder values after defaulting: registered defaults, overridden
    /// by values captured from the URI. Null defaults are left out.
    fn default_values(&self) -> BTreeMap<String, String> {
        self.route
            .defaults()
            .iter()
            .filter_map(|(name, value)| value.clone().map(|v| (name.clone(), v)))
            .collect()
    }

    /// Populate the request's parameters when the URI differs from the
    /// pattern. Precedence, lowest first: defaults, parameters already on
    /// the request, values from the URI.
    pub fn bind(&self, request: &mut Request) {
        if self.pattern() == self.uri {
            return;
        }

        let mut params = self.default_values();
        params.extend(request.params().clone());
        params.extend(self.captured.clone());
        request.set_params(params);
    }
}

/// Resolve `uri` against the table, trying each phase in order.
pub fn resolve<'a>(table: &'a RouteTable, uri: &str) -> Result<RouteMatch<'a>, RouteNotFound> {
    let matched = exact_match(table, uri)
        .or_else(|| strict_match(table, uri))
        .or_else(|| defaulted_match(table, uri));

    match matched {
        Some(m) => {
            tracing::debug!(uri = %uri, pattern = %m.pattern(), phase = %m.phase, "Route matched");
            Ok(m)
        }
        None => {
            tracing::debug!(uri = %uri, "No route matched");
            Err(RouteNotFound {
                uri: uri.to_string(),
            })
        }
    }
}

fn exact_match<'a>(table: &'a RouteTable, uri: &str) -> Option<RouteMatch<'a>> {
    table.get(uri).map(|route| RouteMatch {
        route,
        phase: MatchPhase::Exact,
        uri: uri.to_string(),
        captured: BTreeMap::new(),
    })
}

fn strict_match<'a>(table: &'a RouteTable, uri: &str) -> Option<RouteMatch<'a>> {
    table.iter().find_map(|route| {
        route.compiled().captures_strict(uri).map(|captured| RouteMatch {
            route,
            phase: MatchPhase::Strict,
            uri: uri.to_string(),
            captured,
        })
    })
}

fn defaulted_match<'a>(table: &'a RouteTable, uri: &str) -> Option<RouteMatch<'a>> {
    table.iter().find_map(|route| {
        route.compiled().captures_defaulted(uri).map(|captured| RouteMatch {
            route,
            phase: MatchPhase::Defaulted,
            uri: uri.to_string(),
            captured,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AlphaResult;
    use crate::http::Response;

    fn ok_handler(_req: &Request) -> AlphaResult<Response> {
        Ok(Response::ok("ok"))
    }

    fn article_table() -> RouteTable {
        let mut table = RouteTable::new();
        table.add_route("/login", ok_handler).unwrap();
        table
            .add_route("/a/{title}/{mode}", ok_handler)
            .unwrap()
            .with_default("mode", "read")
            .with_null_default("title");
        table
    }

    #[test]
    fn test_exact_match_for_static_routes() {
        let table = article_table();
        let m = table.resolve("/login").unwrap();
        assert_eq!(m.pattern(), "/login");
        assert_eq!(m.phase(), MatchPhase::Exact);
    }

    #[test]
    fn test_static_route_only_matches_itself() {
        let table = article_table();
        assert!(table.resolve("/login/extra").is_err());
        assert!(table.resolve("/logi").is_err());
    }

    #[test]
    fn test_article_scenario() {
        let table = article_table();

        let m = table.resolve("/a").unwrap();
        assert_eq!(m.pattern(), "/a/{title}/{mode}");
        assert_eq!(m.phase(), MatchPhase::Defaulted);
        let mut req = Request::get("/a");
        m.bind(&mut req);
        assert_eq!(req.param("title"), None);
        assert_eq!(req.param("mode"), Some("read"));

        let m = table.resolve("/a/myTitle").unwrap();
        let mut req = Request::get("/a/myTitle");
        m.bind(&mut req);
        assert_eq!(req.param("title"), Some("myTitle"));
        assert_eq!(req.param("mode"), Some("read"));

        let m = table.resolve("/a/myTitle/edit").unwrap();
        assert_eq!(m.phase(), MatchPhase::Strict);
        let mut req = Request::get("/a/myTitle/edit");
        m.bind(&mut req);
        assert_eq!(req.param("title"), Some("myTitle"));
        assert_eq!(req.param("mode"), Some("edit"));
    }

    #[test]
    fn test_all_defaults_on_bare_prefix() {
        let mut table = RouteTable::new();
        table
            .add_route("/feed/{type}/{limit}", ok_handler)
            .unwrap()
            .with_default("type", "rss")
            .with_default("limit", "10");

        let m = table.resolve("/feed").unwrap();
        let mut req = Request::get("/feed");
        m.bind(&mut req);
        assert_eq!(req.param("type"), Some("rss"));
        assert_eq!(req.param("limit"), Some("10"));
        assert_eq!(req.params().len(), 2);
    }

    #[test]
    fn test_strict_preferred_over_defaulted() {
        let mut table = RouteTable::new();
        table.add_route("/x/{a}/{b}", ok_handler).unwrap();
        table.add_route("/x/{c}", ok_handler).unwrap();

        // "/x/{a}/{b}" is registered first but only matches /x/1 by omitting
        // a segment, so the strict match on "/x/{c}" wins.
        let m = table.resolve("/x/1").unwrap();
        assert_eq!(m.pattern(), "/x/{c}");
        assert_eq!(m.phase(), MatchPhase::Strict);
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let mut table = RouteTable::new();
        table.add_route("/p/{one}/{two}", ok_handler).unwrap();
        table.add_route("/p/{x}/{y}/{z}", ok_handler).unwrap();
        assert_eq!(table.resolve("/p").unwrap().pattern(), "/p/{one}/{two}");

        let mut table = RouteTable::new();
        table.add_route("/p/{x}/{y}/{z}", ok_handler).unwrap();
        table.add_route("/p/{one}/{two}", ok_handler).unwrap();
        assert_eq!(table.resolve("/p").unwrap().pattern(), "/p/{x}/{y}/{z}");
    }

    #[test]
    fn test_exact_lookup_independent_of_order() {
        let mut table = RouteTable::new();
        table.add_route("/{anything}", ok_handler).unwrap();
        table.add_route("/cache", ok_handler).unwrap();
        let m = table.resolve("/cache").unwrap();
        assert_eq!(m.pattern(), "/cache");
        assert_eq!(m.phase(), MatchPhase::Exact);
    }

    #[test]
    fn test_uri_values_override_existing_params() {
        let table = article_table();
        let m = table.resolve("/a/fromPath").unwrap();
        let mut req = Request::get("/a/fromPath?title=fromQuery&mode=edit");
        m.bind(&mut req);
        assert_eq!(req.param("title"), Some("fromPath"));
        assert_eq!(req.param("mode"), Some("edit"));
    }

    #[test]
    fn test_not_found() {
        let table = article_table();
        let err = table.resolve("/does/not/exist").unwrap_err();
        assert_eq!(err.uri, "/does/not/exist");
    }
}
