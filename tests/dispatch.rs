//! Front controller behaviour, end to end without the HTTP layer.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alpha_router::config::AlphaConfig;
use alpha_router::lifecycle::{bootstrap_with, memory_stores};
use alpha_router::{AlphaError, FrontController, Request, Response};

mod common;

fn show(req: &Request) -> alpha_router::AlphaResult<Response> {
    let body = req
        .params()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    Ok(Response::ok(body))
}

fn front_with(config: AlphaConfig) -> FrontController {
    let config = Arc::new(config);
    let stores = memory_stores(&config);
    let app = bootstrap_with(config, stores, |builder| {
        builder
            .add_route("/a/{title}/{mode}", show)?
            .with_default("mode", "read")
            .with_null_default("title");
        builder.add_route("/users/{id}/posts/{post}", show)?;
        builder.add_route("/about", |_req: &Request| Ok(Response::ok("about")))?;
        builder.register_controller("Search", || Box::new(show) as Box<dyn alpha_router::Handler>);
        Ok(())
    })
    .unwrap();
    Arc::try_unwrap(app.front).unwrap()
}

fn front() -> FrontController {
    front_with(common::test_config())
}

#[test]
fn test_default_binding_scenario() {
    let front = front();
    assert_eq!(front.process(Request::get("/a")).unwrap().body_text(), "mode=read");
    assert_eq!(
        front.process(Request::get("/a/myTitle")).unwrap().body_text(),
        "mode=read&title=myTitle"
    );
    assert_eq!(
        front.process(Request::get("/a/myTitle/edit")).unwrap().body_text(),
        "mode=edit&title=myTitle"
    );
}

#[test]
fn test_placeholders_extracted_verbatim() {
    let res = front().process(Request::get("/users/007/posts/3.5")).unwrap();
    assert_eq!(res.body_text(), "id=007&post=3.5");
}

#[test]
fn test_exact_route() {
    assert_eq!(front().process(Request::get("/about")).unwrap().body_text(), "about");
}

#[test]
fn test_unregistered_uri() {
    let err = front().process(Request::get("/does/not/exist")).unwrap_err();
    assert!(matches!(&err, AlphaError::ResourceNotFound(message) if message == "Resource not found"));
}

#[test]
fn test_secure_token_roundtrip() {
    let front = front();
    assert_eq!(front.encode_query("act=Search&q=hello"), common::SEARCH_TOKEN);

    let params = front.decode_query_params(common::SEARCH_TOKEN).unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params["act"], "Search");
    assert_eq!(params["q"], "hello");
}

#[test]
fn test_token_dispatch_both_styles() {
    let front = front();
    let path = front
        .process(Request::get(format!("/tk/{}", common::SEARCH_TOKEN)))
        .unwrap();
    assert!(path.body_text().contains("q=hello"));

    let query = front
        .process(Request::get("/").with_param("tk", common::SEARCH_TOKEN))
        .unwrap();
    assert!(query.body_text().contains("act=Search"));
}

#[test]
fn test_blacklisted_client_never_reaches_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut config = common::test_config();
    config.filters.client_blacklist.enabled = true;
    config.filters.client_blacklist.entries = vec!["BadBot/1.0".to_string()];
    let config = Arc::new(config);
    let stores = memory_stores(&config);
    let app = bootstrap_with(config, stores, move |builder| {
        builder.add_route("/count", move |_req: &Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Response::ok("counted"))
        })?;
        Ok(())
    })
    .unwrap();

    let err = app
        .front
        .process(Request::get("/count").with_header("User-Agent", "BadBot/1.0"))
        .unwrap_err();
    assert!(matches!(err, AlphaError::ResourceNotAllowed(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    app.front
        .process(Request::get("/count").with_header("User-Agent", "Mozilla/5.0"))
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_temp_blacklist_after_repeated_bad_requests() {
    let mut config = common::test_config();
    config.filters.client_temp_blacklist.enabled = true;
    config.filters.client_temp_blacklist.limit = 2;
    let config = Arc::new(config);
    let stores = memory_stores(&config);
    let app = bootstrap_with(config, stores, |_| Ok(())).unwrap();
    let log = app.bad_requests.clone().unwrap();

    let ip: IpAddr = "198.51.100.4".parse().unwrap();
    let request = || Request::get("/health").with_ip(ip).with_header("User-Agent", "scanner");

    assert!(app.front.process(request()).is_ok());
    for _ in 0..2 {
        log.record(alpha_router::security::BadRequest::new("scanner", "198.51.100.4", "/wp-admin"));
    }
    let err = app.front.process(request()).unwrap_err();
    assert!(matches!(err, AlphaError::ResourceNotAllowed(_)));

    let other = Request::get("/health").with_ip(ip).with_header("User-Agent", "browser");
    assert!(app.front.process(other).is_ok());
}
