//! Response value object.
//!
//! # Responsibilities
//! - Carry status, headers and body back from handlers
//! - Report whether a handler produced a well-formed response
//!
//! # Design Decisions
//! - Status is a raw `u16` so a malformed handler result is representable
//!   and can be rejected by the dispatcher instead of coerced
//! - Conversion to an axum response lives in `server.rs`

use std::borrow::Cow;
use std::collections::BTreeMap;

/// A handler's answer to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Plain text body with the given status.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, body.into()).with_header("content-type", "text/plain; charset=utf-8")
    }

    /// 200 with a plain text body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::text(200, body)
    }

    /// JSON body with the given status.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string()).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn into_parts(self) -> (u16, BTreeMap<String, String>, Vec<u8>) {
        (self.status, self.headers, self.body)
    }

    /// A response is well formed when its status is a valid HTTP status code.
    pub fn is_well_formed(&self) -> bool {
        (100..=599).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed() {
        assert!(Response::ok("hi").is_well_formed());
        assert!(Response::text(404, "Resource not found").is_well_formed());
        assert!(!Response::new(42, "").is_well_formed());
        assert!(!Response::new(600, "").is_well_formed());
    }

    #[test]
    fn test_json_response() {
        let res = Response::json(200, &serde_json::json!({ "status": "ok" }));
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.body_text(), r#"{"status":"ok"}"#);
    }
}
