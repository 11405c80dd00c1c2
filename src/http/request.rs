//! Request value object.
//!
//! # Responsibilities
//! - Carry method, URI, parameters, headers, body and client address
//! - Parse an inline query string into parameters
//! - Expose the routing-relevant pieces (URI, user agent, client IP)
//!
//! # Design Decisions
//! - Plain data: full HTTP parsing happens at the axum boundary
//! - Header names are stored lowercased so lookups are case-insensitive
//! - Parameters are ordered (`BTreeMap`) for stable logging and tests

use std::collections::BTreeMap;
use std::net::IpAddr;

use axum::http::Method;

/// An incoming request as seen by the front controller.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    params: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
    ip: Option<IpAddr>,
}

impl Request {
    /// Create a request. Anything after `?` in `uri` is parsed into parameters.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        let mut params = BTreeMap::new();
        if let Some(query) = query {
            for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
                params.insert(k.into_owned(), v.into_owned());
            }
        }

        Self {
            method,
            uri: if path.is_empty() { "/".to_string() } else { path.to_string() },
            params,
            headers: BTreeMap::new(),
            body: Vec::new(),
            ip: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(uri: impl AsRef<str>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = Some(ip);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, without query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) {
        self.uri = uri.into();
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Replace the whole parameter set.
    pub fn set_params(&mut self, params: BTreeMap<String, String>) {
        self.params = params;
    }

    /// Add parameters that are not already present on the request.
    pub fn merge_missing_params<I>(&mut self, params: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in params {
            self.params.entry(name).or_insert(value);
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// The client identity string used by the client blacklists.
    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
