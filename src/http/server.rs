//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Convert axum requests into front controller requests and back
//! - Record bad requests for the temporary blacklist
//! - Bind server to listener and drain on shutdown
//!
//! # Design Decisions
//! - Dispatch is synchronous; it runs on the blocking pool so handlers
//!   never stall the reactor
//! - Error bodies for server errors are generic; details go to the log

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{header, request::Parts, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AlphaConfig;
use crate::dispatch::FrontController;
use crate::error::AlphaError;
use crate::http::{Request, Response};
use crate::lifecycle::Application;
use crate::observability::metrics;
use crate::security::{BadRequest, BadRequestLog};

/// Header that lets HTML forms tunnel other methods through POST.
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub front: Arc<FrontController>,
    pub bad_requests: Option<Arc<dyn BadRequestLog>>,
    pub base_path: Arc<str>,
    pub max_body_size: usize,
}

/// HTTP server for the front controller.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &AlphaConfig, app: &Application) -> Self {
        let state = AppState {
            front: app.front.clone(),
            bad_requests: app.bad_requests.clone(),
            base_path: config.app.base_path().into(),
            max_body_size: config.app.max_body_size,
        };

        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AlphaConfig, state: AppState) -> Router {
        let max_body_size = state.max_body_size;
        Router::new()
            .route("/", any(front_handler))
            .route("/{*path}", any(front_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the front controller.
async fn front_handler(State(state): State<AppState>, request: axum::extract::Request) -> axum::response::Response {
    let start = Instant::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let (parts, body) = request.into_parts();
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            metrics::record_request(StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let request = to_front_request(&state.base_path, &parts, body, peer);
    let uri = request.uri().to_string();
    let client = request.user_agent().unwrap_or_default().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        uri = %uri,
        "Dispatching request"
    );

    let front = state.front.clone();
    let response = match tokio::task::spawn_blocking(move || front.process(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => error_response(&request_id, &uri, &e),
        Err(e) => {
            tracing::error!(request_id = %request_id, uri = %uri, error = %e, "Dispatch task failed");
            Response::text(500, "Internal server error")
        }
    };

    if response.status() == StatusCode::NOT_FOUND.as_u16() {
        if let Some(log) = &state.bad_requests {
            let ip = peer.map(|ip| ip.to_string()).unwrap_or_default();
            log.record(BadRequest::new(client, ip, uri));
            metrics::record_bad_request();
        }
    }

    metrics::record_request(response.status(), start);
    into_http_response(response)
}

/// Map a dispatch error to the response the client sees.
fn error_response(request_id: &str, uri: &str, error: &AlphaError) -> Response {
    match error {
        AlphaError::ResourceNotFound(message) | AlphaError::ResourceNotAllowed(message) => {
            Response::text(error.status_code(), message.clone())
        }
        other => {
            tracing::error!(request_id = %request_id, uri = %uri, error = %other, "Request failed");
            Response::text(other.status_code(), "Internal server error")
        }
    }
}

/// Build the front controller's view of an incoming request.
fn to_front_request(base_path: &str, parts: &Parts, body: Bytes, peer: Option<IpAddr>) -> Request {
    let path = strip_base_path(base_path, parts.uri.path());
    let target = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut request = Request::new(effective_method(parts), target);
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    let is_form = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        request.merge_missing_params(
            url::form_urlencoded::parse(&body).map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
    }

    let mut request = request.with_body(body.to_vec());
    if let Some(ip) = peer {
        request = request.with_ip(ip);
    }
    request
}

/// POST requests may carry the intended method in an override header.
fn effective_method(parts: &Parts) -> Method {
    if parts.method != Method::POST {
        return parts.method.clone();
    }
    parts
        .headers
        .get(METHOD_OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Method::from_bytes(v.trim().to_ascii_uppercase().as_bytes()).ok())
        .unwrap_or(Method::POST)
}

/// Remove the mount path the application is served under.
fn strip_base_path<'a>(base_path: &str, path: &'a str) -> &'a str {
    if base_path.is_empty() {
        return path;
    }
    match path.strip_prefix(base_path) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

fn into_http_response(response: Response) -> axum::response::Response {
    let (status, headers, body) = response.into_parts();
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut http = (status, Body::from(body)).into_response();
    for (name, value) in headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                http.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    http
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(method: Method, uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_strip_base_path() {
        assert_eq!(strip_base_path("", "/a/b"), "/a/b");
        assert_eq!(strip_base_path("/app", "/app"), "/");
        assert_eq!(strip_base_path("/app", "/app/a/b"), "/a/b");
        assert_eq!(strip_base_path("/app", "/application"), "/application");
        assert_eq!(strip_base_path("/app", "/other"), "/other");
    }

    #[test]
    fn test_method_override_only_on_post() {
        let post = parts(Method::POST, "/", &[(METHOD_OVERRIDE_HEADER, "delete")]);
        assert_eq!(effective_method(&post), Method::DELETE);

        let get = parts(Method::GET, "/", &[(METHOD_OVERRIDE_HEADER, "DELETE")]);
        assert_eq!(effective_method(&get), Method::GET);
    }

    #[test]
    fn test_front_request_conversion() {
        let p = parts(
            Method::POST,
            "/app/search?q=query",
            &[
                ("content-type", "application/x-www-form-urlencoded"),
                ("user-agent", "curl/8.0"),
            ],
        );
        let ip: IpAddr = "192.0.2.1".parse().unwrap();
        let req = to_front_request("/app", &p, Bytes::from_static(b"q=form&page=2"), Some(ip));

        assert_eq!(req.uri(), "/search");
        assert_eq!(req.param("q"), Some("query"));
        assert_eq!(req.param("page"), Some("2"));
        assert_eq!(req.user_agent(), Some("curl/8.0"));
        assert_eq!(req.ip(), Some(ip));
        assert_eq!(req.body(), b"q=form&page=2");
    }

    #[test]
    fn test_error_response_hides_internal_details() {
        let res = error_response("id", "/x", &AlphaError::UnknownController("Secret".into()));
        assert_eq!(res.status(), 500);
        assert_eq!(res.body_text(), "Internal server error");

        let res = error_response("id", "/x", &AlphaError::ResourceNotAllowed("Not allowed!".into()));
        assert_eq!(res.status(), 403);
        assert_eq!(res.body_text(), "Not allowed!");
    }

    #[test]
    fn test_invalid_status_becomes_500() {
        let res = into_http_response(Response::new(42, "bad"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
