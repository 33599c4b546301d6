//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that backends are absolute http(s) URLs
//! - Check that header filters carry valid names and values
//! - Validate value ranges (buffer sizes > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method};
use url::Url;

use crate::config::schema::{HeaderAction, ProxyConfig, RouteConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate the whole configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.streaming.buffer_size == 0 {
        errors.push(ValidationError::new("streaming.buffer_size", "must be greater than 0"));
    }
    if config.streaming.channel_capacity == 0 {
        errors.push(ValidationError::new("streaming.channel_capacity", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }

    let obs = &config.observability;
    if !LOG_LEVELS.contains(&obs.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", obs.log_level),
        ));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", obs.metrics_address),
        ));
    }

    let mut names = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{}]", i);
        if route.name.is_empty() {
            errors.push(ValidationError::new(format!("{field}.name"), "must not be empty"));
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{field}.name"),
                format!("duplicate route name '{}'", route.name),
            ));
        }
        validate_route(&field, route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(field: &str, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    if let Some(backend) = &route.backend {
        if let Err(message) = check_backend_url(backend) {
            errors.push(ValidationError::new(format!("{field}.backend"), message));
        }
    }

    if let Some(prefix) = &route.path_prefix {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(
                format!("{field}.path_prefix"),
                "must start with '/'",
            ));
        }
    }

    for method in &route.methods {
        if method.parse::<Method>().is_err() {
            errors.push(ValidationError::new(
                format!("{field}.methods"),
                format!("invalid method '{}'", method),
            ));
        }
    }

    for (j, filter) in route.filters.iter().enumerate() {
        let field = format!("{field}.filters[{j}]");
        if HeaderName::from_bytes(filter.name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                format!("{field}.name"),
                format!("invalid header name '{}'", filter.name),
            ));
        }
        match (filter.action, &filter.value) {
            (HeaderAction::Remove, _) => {}
            (_, None) => errors.push(ValidationError::new(
                format!("{field}.value"),
                "required for set and append",
            )),
            (_, Some(value)) => {
                if HeaderValue::from_str(value).is_err() {
                    errors.push(ValidationError::new(
                        format!("{field}.value"),
                        "not a valid header value",
                    ));
                }
            }
        }
    }
}

/// Backends must be absolute http(s) URLs with a host.
pub fn check_backend_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("'{}' is not a URL: {}", raw, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err(format!("'{}' has no host", raw));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{FilterConfig, FilterPhase};

    fn route(name: &str) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            host: None,
            path_prefix: Some("/".into()),
            methods: Vec::new(),
            backend: Some("http://127.0.0.1:3000".into()),
            priority: 0,
            filters: Vec::new(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_route_names() {
        let mut config = ProxyConfig::default();
        config.routes.push(route("a"));
        config.routes.push(route("a"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routes[1].name");
    }

    #[test]
    fn test_route_without_backend_is_accepted() {
        let mut config = ProxyConfig::default();
        let mut r = route("a");
        r.backend = None;
        config.routes.push(r);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_route_errors() {
        let mut config = ProxyConfig::default();
        let mut r = route("a");
        r.path_prefix = Some("api".into());
        r.methods = vec!["G ET".into()];
        r.backend = Some("not a url".into());
        r.filters.push(FilterConfig {
            id: None,
            phase: FilterPhase::Request,
            action: HeaderAction::Set,
            name: "X-Ok".into(),
            value: None,
        });
        config.routes.push(r);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "routes[0].backend",
                "routes[0].path_prefix",
                "routes[0].methods",
                "routes[0].filters[0].value",
            ]
        );
    }

    #[test]
    fn test_backend_url_checks() {
        assert!(check_backend_url("http://backend.example/bar").is_ok());
        assert!(check_backend_url("https://backend.example").is_ok());
        assert!(check_backend_url("ftp://backend.example").is_err());
        assert!(check_backend_url("/relative").is_err());
    }
}
