//! Per-request orchestration.
//!
//! ```text
//! Start → SettingsResolved → RouteResolved → RequestFiltered
//!       → Dispatched → ResponseFiltered → Streamed
//!
//! any state before the head is written → Failed(kind)
//!     → one empty-bodied status response + `proxy: ...` log line
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::response::IntoResponse;

use crate::error::ProxyError;
use crate::filter::{run_request_phase, run_response_phase, FilterContext};
use crate::observability::metrics;
use crate::proxy::streamer::{self, StreamStats, DEFAULT_BUFFER_SIZE, DEFAULT_CHANNEL_CAPACITY};
use crate::proxy::writer::ChannelWriter;
use crate::proxy::{mapper, resolver, transport::Transport};
use crate::settings::SettingsHolder;

/// The request-handling core shared by all connections.
pub struct Proxy {
    settings: Arc<SettingsHolder>,
    transport: Arc<dyn Transport>,
    buffer_size: usize,
    channel_capacity: usize,
}

impl Proxy {
    pub fn new(settings: Arc<SettingsHolder>, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
            buffer_size: DEFAULT_BUFFER_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Largest body piece flushed to the caller at once.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Flushed pieces allowed in flight towards a slow caller.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn settings(&self) -> &Arc<SettingsHolder> {
        &self.settings
    }

    /// Proxy one request. Failures become a single empty-bodied status.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let method = request.method().clone();
        let target = request.uri().clone();

        match self.forward(request).await {
            Ok(response) => response,
            Err(err) => {
                let status = err.status_code();
                tracing::warn!(
                    kind = %err.kind(),
                    method = %method,
                    target = %target,
                    status = status.as_u16(),
                    "{}",
                    err
                );
                metrics::record_failure(err.kind());
                metrics::record_request(method.as_str(), status.as_u16(), "none", start);
                status.into_response()
            }
        }
    }

    /// Proxy one request, returning the failure instead of rendering it.
    ///
    /// On success the response head is final and its body is fed by a
    /// spawned task streaming the backend body.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let start = Instant::now();

        // Start → SettingsResolved → RouteResolved
        let snapshot = self.settings.current();
        let (head, body) = request.into_parts();
        let method = head.method.clone();
        let route = resolver::resolve(snapshot.as_deref(), &head)?;
        drop(snapshot);

        tracing::debug!(
            route = route.name(),
            method = %head.method,
            target = %head.uri,
            filters = route.filters().len(),
            "Route resolved"
        );

        let (mut writer, pending) = ChannelWriter::new(self.channel_capacity);
        let mut ctx = FilterContext::new(&mut writer, head);

        // RouteResolved → RequestFiltered
        run_request_phase(route.filters(), &mut ctx);

        // RequestFiltered → Dispatched
        let outbound = mapper::build(ctx.request(), body, route.backend())?;
        let backend_target = outbound.uri().to_string();
        let response = self
            .transport
            .round_trip(outbound)
            .await
            .map_err(ProxyError::Backend)?;

        // Dispatched → ResponseFiltered
        let (response_head, response_body) = response.into_parts();
        ctx.set_response(response_head);
        run_response_phase(route.filters(), &mut ctx);
        let response_head = ctx.into_response();

        // ResponseFiltered → Streamed
        streamer::write_head(&mut writer, &response_head);
        metrics::record_request(method.as_str(), response_head.status.as_u16(), route.name(), start);

        let route_name = route.name().to_string();
        let buffer_size = self.buffer_size;
        tokio::spawn(async move {
            let mut stats = StreamStats::default();
            match streamer::copy_body(&mut writer, response_body, buffer_size, &mut stats).await {
                Ok(stats) => {
                    tracing::debug!(
                        route = %route_name,
                        backend = %backend_target,
                        bytes = stats.bytes,
                        flushes = stats.flushes,
                        "Response streamed"
                    );
                    metrics::record_stream(stats.bytes, true);
                }
                Err(e) => {
                    tracing::warn!(
                        kind = "StreamError",
                        route = %route_name,
                        backend = %backend_target,
                        bytes_delivered = stats.bytes,
                        error = %e,
                        "Response truncated"
                    );
                    metrics::record_stream(stats.bytes, false);
                    writer.fail(e.to_string()).await;
                }
            }
        });

        Ok(pending.into_response().await)
    }
}
