//! Route lookup.
//!
//! # Responsibilities
//! - Compile route configs into matchers, backends and filters
//! - Look up the matching route for a request head
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over routes sorted by priority (acceptable for typical counts)
//! - Equal priorities keep declaration order
//! - Explicit no-match rather than silent default

use std::sync::Arc;

use axum::http::{request::Parts, Method};

use crate::config::schema::RouteConfig;
use crate::config::validation::check_backend_url;
use crate::error::BoxError;
use crate::filter::{Filter, HeaderFilter};
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, MethodMatcher, PathPrefixMatcher};
use crate::routing::route::{Backend, Route};
use crate::settings::Settings;

/// Failure compiling a route config.
#[derive(Debug, thiserror::Error)]
#[error("route '{route}': {reason}")]
pub struct RouteBuildError {
    pub route: String,
    pub reason: String,
}

#[derive(Debug)]
struct CompiledRoute {
    matcher: AndMatcher,
    route: Arc<Route>,
}

/// A routing snapshot compiled from `[[routes]]`.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    /// Compile the given route configs.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteBuildError> {
        let mut ordered: Vec<&RouteConfig> = configs.iter().collect();
        // Stable sort: equal priorities keep declaration order.
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

        let routes = ordered
            .into_iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { routes })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn compile(config: &RouteConfig) -> Result<CompiledRoute, RouteBuildError> {
    let fail = |reason: String| RouteBuildError {
        route: config.name.clone(),
        reason,
    };

    let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
    if let Some(host) = &config.host {
        matchers.push(Box::new(HostMatcher::new(host.clone())));
    }
    if let Some(prefix) = &config.path_prefix {
        matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
    }
    if !config.methods.is_empty() {
        let methods = config
            .methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.to_uppercase().as_bytes())
                    .map_err(|_| fail(format!("invalid method '{}'", m)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        matchers.push(Box::new(MethodMatcher::new(methods)));
    }

    let backend = match &config.backend {
        Some(raw) => Some(Backend::new(check_backend_url(raw).map_err(fail)?)),
        None => {
            tracing::warn!(route = %config.name, "Route has no backend, requests will fail");
            None
        }
    };

    let mut route = Route::new(config.name.clone(), backend);
    for filter in &config.filters {
        let filter: Arc<dyn Filter> = Arc::new(HeaderFilter::from_config(filter).map_err(fail)?);
        route = route.with_filter(filter);
    }

    Ok(CompiledRoute {
        matcher: AndMatcher::new(matchers),
        route: Arc::new(route),
    })
}

impl Settings for RouteTable {
    fn route(&self, request: &Parts) -> Result<Option<Arc<Route>>, BoxError> {
        Ok(self
            .routes
            .iter()
            .find(|r| r.matcher.matches(request))
            .map(|r| r.route.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{FilterConfig, FilterPhase, HeaderAction};
    use axum::http::Request;

    fn route(name: &str, prefix: &str, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            host: None,
            path_prefix: Some(prefix.into()),
            methods: Vec::new(),
            backend: Some(format!("http://backend.example/{}", name)),
            priority,
            filters: Vec::new(),
        }
    }

    fn resolve(table: &RouteTable, uri: &str) -> Option<String> {
        let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        table.route(&parts).unwrap().map(|r| r.name().to_string())
    }

    #[test]
    fn test_priority_then_declaration_order() {
        let table = RouteTable::from_config(&[
            route("catch-all", "/", 0),
            route("api", "/api", 10),
            route("api-shadow", "/api", 10),
        ])
        .unwrap();

        assert_eq!(resolve(&table, "/api/users").as_deref(), Some("api"));
        assert_eq!(resolve(&table, "/other").as_deref(), Some("catch-all"));
    }

    #[test]
    fn test_no_match() {
        let table = RouteTable::from_config(&[route("api", "/api", 0)]).unwrap();
        assert_eq!(resolve(&table, "/images"), None);
        assert_eq!(resolve(&RouteTable::default(), "/"), None);
    }

    #[test]
    fn test_methods_and_filters_compiled() {
        let mut config = route("writes", "/", 0);
        config.methods = vec!["post".into()];
        config.filters.push(FilterConfig {
            id: None,
            phase: FilterPhase::Response,
            action: HeaderAction::Append,
            name: "X-Res".into(),
            value: Some("1".into()),
        });
        let table = RouteTable::from_config(&[config]).unwrap();

        let (post, _) = Request::post("/x").body(()).unwrap().into_parts();
        let matched = table.route(&post).unwrap().unwrap();
        assert_eq!(matched.filters().len(), 1);
        assert_eq!(matched.backend().unwrap().url().as_str(), "http://backend.example/writes");

        let (get, _) = Request::get("/x").body(()).unwrap().into_parts();
        assert!(table.route(&get).unwrap().is_none());
    }

    #[test]
    fn test_invalid_backend_is_reported() {
        let mut config = route("bad", "/", 0);
        config.backend = Some("gopher://x".into());
        let err = RouteTable::from_config(&[config]).unwrap_err();
        assert_eq!(err.route, "bad");
    }
}
