//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use alpha_router::config::AlphaConfig;
use alpha_router::http::HttpServer;
use alpha_router::lifecycle::{bootstrap, Application, Shutdown};

#[allow(dead_code)]
/// Key the token fixtures were produced with.
pub const TEST_KEY: &str = "alpha-router-test-key-32-bytes!!";

#[allow(dead_code)]
/// `act=Search&q=hello` under [`TEST_KEY`].
pub const SEARCH_TOKEN: &str = "fBnrwFvinKrXrEP-19YNhtlEstMFhQiiLE5mxyPktmA=";

/// Default configuration with the fixture key.
pub fn test_config() -> AlphaConfig {
    let mut config = AlphaConfig::default();
    config.security.encryption_key = TEST_KEY.to_string();
    config.app.url = "http://localhost:8080/".to_string();
    config.app.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Running server bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub app: Application,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Bootstrap `config` and serve it on 127.0.0.1 with an OS-assigned port.
#[allow(dead_code)]
pub async fn spawn_server(config: AlphaConfig) -> TestServer {
    let config = Arc::new(config);
    let app = bootstrap(config.clone()).unwrap();
    let server = HttpServer::new(&config, &app);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, app, shutdown }
}

/// In-process router for `tower::ServiceExt::oneshot`.
#[allow(dead_code)]
pub fn router(config: AlphaConfig) -> axum::Router {
    let config = Arc::new(config);
    let app = bootstrap(config.clone()).unwrap();
    HttpServer::new(&config, &app).router()
}
