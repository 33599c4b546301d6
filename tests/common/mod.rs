//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, Response, StatusCode},
    Router,
};
use tokio::net::TcpListener;

/// What a mock backend has seen.
#[derive(Default)]
pub struct Recorded {
    calls: AtomicUsize,
    headers: Mutex<Vec<HeaderMap>>,
}

impl Recorded {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Headers of the most recent request.
    pub fn last_headers(&self) -> Option<HeaderMap> {
        self.headers.lock().unwrap().last().cloned()
    }
}

/// Start a backend that records each request and answers with `body`
/// plus an `X-Backend: yes` header.
pub async fn start_recording_backend(body: Vec<u8>) -> (SocketAddr, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());
    let body = Arc::new(body);

    let app = Router::new()
        .fallback(
            |State((recorded, body)): State<(Arc<Recorded>, Arc<Vec<u8>>)>, request: Request<Body>| async move {
                recorded.calls.fetch_add(1, Ordering::SeqCst);
                recorded.headers.lock().unwrap().push(request.headers().clone());
                Response::builder()
                    .status(StatusCode::OK)
                    .header("X-Backend", "yes")
                    .body(Body::from(body.as_ref().clone()))
                    .unwrap()
            },
        )
        .with_state((recorded.clone(), body));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorded)
}

/// An address nothing is listening on.
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Proxy configuration with a single catch-all route to `backend`.
pub fn single_route_config(backend: &str) -> String {
    format!(
        r#"
[listener]
bind_address = "127.0.0.1:0"

[[routes]]
name = "all"
path_prefix = "/"
backend = "{backend}"

[[routes.filters]]
phase = "request"
action = "set"
name = "X-Req"
value = "1"

[[routes.filters]]
phase = "response"
action = "set"
name = "X-Res"
value = "1"
"#
    )
}

/// Formatted log output of everything emitted on the installing thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    /// Capture until the guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}
