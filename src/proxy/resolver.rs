//! Route resolution against one snapshot.

use std::sync::Arc;

use axum::http::request::Parts;

use crate::error::ProxyError;
use crate::routing::Route;
use crate::settings::Snapshot;

/// Resolve the request head to a route.
///
/// An absent snapshot is `NoSettings`; a miss or a matching failure from the
/// snapshot is `NoRoute`.
pub fn resolve(snapshot: Option<&Snapshot>, request: &Parts) -> Result<Arc<Route>, ProxyError> {
    let snapshot = snapshot.ok_or(ProxyError::NoSettings)?;

    match snapshot.settings().route(request) {
        Ok(Some(route)) => Ok(route),
        Ok(None) => Err(ProxyError::NoRoute {
            target: request.uri.to_string(),
            detail: "no matching route".to_string(),
        }),
        Err(e) => Err(ProxyError::NoRoute {
            target: request.uri.to_string(),
            detail: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, FailureKind};
    use crate::settings::{Settings, SettingsHolder};
    use axum::http::Request;

    struct Fixed(Result<Option<Arc<Route>>, &'static str>);

    impl Settings for Fixed {
        fn route(&self, _request: &Parts) -> Result<Option<Arc<Route>>, BoxError> {
            self.0.clone().map_err(Into::into)
        }
    }

    fn head() -> Parts {
        Request::get("/foo").body(()).unwrap().into_parts().0
    }

    fn kind_with(settings: Fixed) -> Result<Arc<Route>, FailureKind> {
        let holder = SettingsHolder::new();
        holder.publish(settings);
        let snapshot = holder.current();
        resolve(snapshot.as_deref(), &head()).map_err(|e| e.kind())
    }

    #[test]
    fn test_absent_snapshot() {
        let err = resolve(None, &head()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoSettings);
    }

    #[test]
    fn test_match_propagates_route() {
        let route = Arc::new(Route::new("r", None));
        let resolved = kind_with(Fixed(Ok(Some(route.clone())))).unwrap();
        assert!(Arc::ptr_eq(&resolved, &route));
    }

    #[test]
    fn test_miss_and_failure_are_no_route() {
        assert_eq!(kind_with(Fixed(Ok(None))).unwrap_err(), FailureKind::NoRoute);
        assert_eq!(kind_with(Fixed(Err("matcher broke"))).unwrap_err(), FailureKind::NoRoute);
    }

    #[test]
    fn test_no_route_message_names_target() {
        let holder = SettingsHolder::new();
        holder.publish(Fixed(Err("matcher broke")));
        let err = resolve(holder.current().as_deref(), &head()).unwrap_err();
        assert_eq!(err.to_string(), "proxy: routing failed: /foo matcher broke");
    }
}
