//! Error taxonomy for the request path.
//!
//! # Propagation
//! ```text
//! NoSettings / NoRoute / MissingBackend / Mapping / Backend
//!     → abort before any byte reaches the caller
//!     → one empty-bodied status response
//!
//! FilterError  → recovered inside the filter chain, never escapes it
//! StreamError  → only after the head is committed, logged, body truncated
//! ```

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

/// Boxed error used at the seams where collaborators bring their own types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failure that aborts a request before the response head is written.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy: missing settings")]
    NoSettings,

    #[error("proxy: routing failed: {target} {detail}")]
    NoRoute { target: String, detail: String },

    #[error("proxy: missing backend")]
    MissingBackend,

    #[error("proxy: cannot build backend request: {0}")]
    Mapping(String),

    #[error("proxy: backend round trip failed: {0}")]
    Backend(#[source] BoxError),
}

/// Stable names for the failure variants, used as log and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NoSettings,
    NoRoute,
    MissingBackend,
    MappingError,
    BackendError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoSettings => "NoSettings",
            FailureKind::NoRoute => "NoRoute",
            FailureKind::MissingBackend => "MissingBackend",
            FailureKind::MappingError => "MappingError",
            FailureKind::BackendError => "BackendError",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProxyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ProxyError::NoSettings => FailureKind::NoSettings,
            ProxyError::NoRoute { .. } => FailureKind::NoRoute,
            ProxyError::MissingBackend => FailureKind::MissingBackend,
            ProxyError::Mapping(_) => FailureKind::MappingError,
            ProxyError::Backend(_) => FailureKind::BackendError,
        }
    }

    /// Status sent to the caller for this failure.
    ///
    /// Routing misses are 404, an empty holder is 503 (the proxy is not ready
    /// yet), and anything that went wrong talking to the backend is 502.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            FailureKind::NoSettings => StatusCode::SERVICE_UNAVAILABLE,
            FailureKind::NoRoute | FailureKind::MissingBackend => StatusCode::NOT_FOUND,
            FailureKind::MappingError | FailureKind::BackendError => StatusCode::BAD_GATEWAY,
        }
    }
}

/// A filter's own report that it could not apply its mutation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FilterError(String);

impl FilterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A failure while copying the backend body to the caller.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("reading backend body failed: {0}")]
    Read(#[source] BoxError),

    #[error("writing to caller failed: {0}")]
    Write(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_proxy_prefix() {
        assert_eq!(ProxyError::NoSettings.to_string(), "proxy: missing settings");
        assert_eq!(ProxyError::MissingBackend.to_string(), "proxy: missing backend");

        let err = ProxyError::NoRoute {
            target: "/foo".into(),
            detail: "no match".into(),
        };
        assert_eq!(err.to_string(), "proxy: routing failed: /foo no match");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ProxyError::NoSettings.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ProxyError::MissingBackend.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProxyError::Backend("refused".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ProxyError::Mapping("bad".into()).kind(), FailureKind::MappingError);
    }
}
