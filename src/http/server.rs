//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, timeout, tracing)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests
//!
//! # Design Decisions
//! - Every method and path goes to the proxy core; there are no local routes
//! - The request timeout bounds the time to the response head, not the body
//! - `x-request-id` is set before the proxy clones headers, so backends see it

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::proxy::{Proxy, Transport};
use crate::settings::SettingsHolder;

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    proxy: Arc<Proxy>,
}

impl HttpServer {
    /// Create a new HTTP server over the shared settings and transport.
    pub fn new(config: &ProxyConfig, settings: Arc<SettingsHolder>, transport: Arc<dyn Transport>) -> Self {
        let proxy = Arc::new(
            Proxy::new(settings, transport)
                .with_buffer_size(config.streaming.buffer_size)
                .with_channel_capacity(config.streaming.channel_capacity),
        );
        let router = Self::build_router(config, proxy.clone());
        Self { router, proxy }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, proxy: Arc<Proxy>) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(proxy)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn proxy(&self) -> &Arc<Proxy> {
        &self.proxy
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(proxy): State<Arc<Proxy>>, request: Request<Body>) -> Response<Body> {
    proxy.handle(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::proxy::HttpTransport;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(
            &ProxyConfig::default(),
            Arc::new(SettingsHolder::new()),
            Arc::new(HttpTransport::default()),
        )
    }

    #[tokio::test]
    async fn test_request_id_is_propagated_on_failures() {
        let response = server()
            .router()
            .oneshot(Request::get("/anything").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_caller_request_id_is_kept() {
        let response = server()
            .router()
            .oneshot(
                Request::post("/")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() -> Result<(), BoxError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(server().run(listener, rx));

        tx.send(())?;
        handle.await??;
        Ok(())
    }
}
