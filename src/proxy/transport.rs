//! Backend round trips.
//!
//! # Design Decisions
//! - One long-lived pooling client per process, shared by every request
//! - Errors are returned unchanged; no retries at this layer
//! - Plain HTTP connector; `https` targets fail as backend errors

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::schema::TimeoutConfig;
use crate::error::BoxError;

/// Performs the network exchange with a backend.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: Request<Body>) -> Result<Response<Body>, BoxError>;
}

/// Transport backed by hyper's pooling client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Body>,
}

impl HttpTransport {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.pool_idle_secs))
            .build(connector);

        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&TimeoutConfig::default())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn round_trip(&self, request: Request<Body>) -> Result<Response<Body>, BoxError> {
        let response: Response<Incoming> = self.client.request(request).await?;
        Ok(response.map(Body::new))
    }
}
