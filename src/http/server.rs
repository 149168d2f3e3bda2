//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that feeds every request to the [`App`]
//! - Wire up transport layers (timeout, request ID, tracing)
//! - Enforce the request body limit
//! - Bind to a listener and serve until shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::context::Context;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::pipeline::App;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    pub max_body_bytes: usize,
}

/// HTTP front end for an [`App`].
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `app` with the given configuration.
    pub fn new(config: ServerConfig, app: App) -> Self {
        let state = AppState {
            app: Arc::new(app),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving in-process.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Collect the body, run the pipeline, write the rendered response.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let started = Instant::now();
    let (parts, body) = request.into_parts();

    let raw_body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                method = %parts.method,
                path = parts.uri.path(),
                limit = state.max_body_bytes,
                error = %e,
                "Rejected request body"
            );
            metrics::record_request(parts.method.as_str(), 413, started);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let mut ctx = Context::from_parts(parts, raw_body);
    state.app.respond(&mut ctx).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::handler_fn;
    use axum::body::Body;
    use tower::ServiceExt;

    fn server(max_body_bytes: usize) -> Router {
        let mut config = ServerConfig::default();
        config.listener.max_body_bytes = max_body_bytes;
        let mut app = App::new();
        app.with(handler_fn(|ctx| {
            let size = ctx.request.raw_body.len();
            ctx.response.set_body(format!("got {size} bytes"));
            Ok(())
        }));
        HttpServer::new(config, app).into_router()
    }

    #[tokio::test]
    async fn test_dispatch_renders_app_response() {
        let response = server(1024)
            .oneshot(
                axum::http::Request::post("/upload")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"got 5 bytes");
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let response = server(4)
            .oneshot(
                axum::http::Request::post("/upload")
                    .body(Body::from("way too long"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let response = server(1024)
            .oneshot(
                axum::http::Request::get("/")
                    .header("x-request-id", "client-chosen")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "client-chosen");
    }
}
