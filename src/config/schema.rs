//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::proxy::streamer::{DEFAULT_BUFFER_SIZE, DEFAULT_CHANNEL_CAPACITY};

/// Root configuration for the reverse proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping requests to backends.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response streaming settings.
    pub streaming: StreamingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route configuration mapping requests to one backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Host header to match (exact match, case-insensitive).
    pub host: Option<String>,

    /// Path prefix to match.
    pub path_prefix: Option<String>,

    /// Methods to match. Empty matches every method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Absolute backend URL the request is sent to, verbatim.
    pub backend: Option<String>,

    /// Route priority (higher = checked first).
    #[serde(default)]
    pub priority: u32,

    /// Filters in request-phase order.
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

/// A header rewrite applied by a route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Diagnostic name; derived from phase, action and header when absent.
    pub id: Option<String>,

    /// Which side of the exchange the filter rewrites.
    pub phase: FilterPhase,

    pub action: HeaderAction,

    /// Header name.
    pub name: String,

    /// Header value, required for `set` and `append`.
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPhase {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderAction {
    Set,
    Append,
    Remove,
}

/// Timeout configuration for the server and the backend client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed until the response head is ready, in seconds.
    pub request_secs: u64,

    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// How long an idle pooled backend connection is kept, in seconds.
    pub pool_idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            connect_secs: 5,
            pool_idle_secs: 90,
        }
    }
}

/// Response streaming settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Largest chunk written (and flushed) to the caller at once.
    pub buffer_size: usize,

    /// Flushed chunks allowed in flight towards a slow caller.
    pub channel_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.streaming.buffer_size, 8192);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_route_with_filters() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [[routes]]
            name = "api"
            path_prefix = "/api"
            backend = "http://127.0.0.1:3000/bar"

            [[routes.filters]]
            phase = "request"
            action = "append"
            name = "X-Req"
            value = "1"
            "#,
        )
        .unwrap();

        let route = &config.routes[0];
        assert_eq!(route.backend.as_deref(), Some("http://127.0.0.1:3000/bar"));
        assert_eq!(route.filters.len(), 1);
        assert_eq!(route.filters[0].phase, FilterPhase::Request);
        assert_eq!(route.filters[0].action, HeaderAction::Append);
    }
}
