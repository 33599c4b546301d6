//! Outbound request construction.

use axum::body::Body;
use axum::http::{header, request::Parts, Request, Uri};

use crate::error::ProxyError;
use crate::proxy::headers::clone_headers;
use crate::routing::Backend;

/// Build the request sent to `backend`.
///
/// Method and body are passed through, the target is the backend URL, and
/// headers are an independent clone of `head`'s. The inbound `Host` header
/// is left out so the transport addresses the backend by its own authority.
pub fn build(head: &Parts, body: Body, backend: Option<&Backend>) -> Result<Request<Body>, ProxyError> {
    let backend = backend.ok_or(ProxyError::MissingBackend)?;

    let uri: Uri = backend
        .url()
        .as_str()
        .parse()
        .map_err(|e| ProxyError::Mapping(format!("invalid backend target '{}': {}", backend, e)))?;
    match uri.scheme_str() {
        Some("http") | Some("https") if uri.authority().is_some() => {}
        _ => {
            return Err(ProxyError::Mapping(format!(
                "backend target '{}' is not an absolute http(s) URL",
                backend
            )))
        }
    }

    let mut outbound = Request::builder()
        .method(head.method.clone())
        .uri(uri)
        .body(body)
        .map_err(|e| ProxyError::Mapping(e.to_string()))?;

    let mut headers = clone_headers(&head.headers);
    headers.remove(header::HOST);
    *outbound.headers_mut() = headers;

    Ok(outbound)
}
