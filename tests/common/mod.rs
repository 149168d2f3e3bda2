//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tokio::net::TcpListener;

use stratum::config::{ServerConfig, StaticFilesConfig};
use stratum::demo::{create_app, UserStore};
use stratum::{App, HttpServer, Shutdown};

/// Directory holding the static fixtures.
pub fn testdata() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Demo config with the fixtures mounted at `/data`.
pub fn demo_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.errors.expose_details = true;
    config.static_files = Some(StaticFilesConfig {
        mount_path: "/data".to_string(),
        root: testdata().display().to_string(),
    });
    config
}

/// A running server and the means to stop it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

/// Serve `app` on an ephemeral local port.
pub async fn spawn_app(config: ServerConfig, app: App) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    let server = HttpServer::new(config, app);
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Serve the demo application on an ephemeral local port.
pub async fn spawn_demo() -> (TestServer, UserStore) {
    let config = demo_config();
    let store = UserStore::seeded();
    let app = create_app(&config, &store).unwrap();
    (spawn_app(config, app).await, store)
}

/// Client without connection pooling, so each test request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}
