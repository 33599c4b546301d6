//! The caller-facing output sink.
//!
//! A `ResponseWriter` behaves like a classic server response writer: headers
//! are mutable until the status is written, the status commits the head, and
//! body bytes become visible to the caller only when flushed.
//!
//! `ChannelWriter` bridges that model onto axum: the committed head travels
//! over a oneshot channel to the handler, and flushed chunks travel over a
//! bounded channel that backs the response body.

use std::io;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::ReceiverStream;

#[async_trait]
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the status line.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the head. Only the first call has an effect.
    fn write_status(&mut self, status: StatusCode);

    /// Buffer body bytes; commits a `200 OK` head if none was written.
    async fn write(&mut self, chunk: Bytes) -> io::Result<()>;

    /// Deliver everything buffered so far to the caller.
    async fn flush(&mut self) -> io::Result<()>;
}

type Head = (StatusCode, HeaderMap);

/// Writer end of a streamed axum response.
pub struct ChannelWriter {
    headers: HeaderMap,
    head_tx: Option<oneshot::Sender<Head>>,
    pending: BytesMut,
    body_tx: mpsc::Sender<io::Result<Bytes>>,
}

/// Reader end of a `ChannelWriter`, turned into the response handed to axum.
pub struct PendingResponse {
    head_rx: oneshot::Receiver<Head>,
    body_rx: mpsc::Receiver<io::Result<Bytes>>,
}

impl ChannelWriter {
    /// Create a writer whose body channel holds up to `capacity` flushed chunks.
    pub fn new(capacity: usize) -> (Self, PendingResponse) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(capacity.max(1));

        (
            Self {
                headers: HeaderMap::new(),
                head_tx: Some(head_tx),
                pending: BytesMut::new(),
                body_tx,
            },
            PendingResponse { head_rx, body_rx },
        )
    }

    /// Whether the head has been handed to the caller.
    pub fn is_committed(&self) -> bool {
        self.head_tx.is_none()
    }

    /// End the body with an error so the caller observes truncation instead
    /// of a clean end of stream.
    pub async fn fail(mut self, reason: impl Into<String>) {
        self.pending.clear();
        let error = io::Error::new(io::ErrorKind::Other, reason.into());
        let _ = self.body_tx.send(Err(error)).await;
    }
}

#[async_trait]
impl ResponseWriter for ChannelWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if let Some(tx) = self.head_tx.take() {
            let headers = std::mem::take(&mut self.headers);
            // The handler only drops the receiver when the request is gone.
            let _ = tx.send((status, headers));
        }
    }

    async fn write(&mut self, chunk: Bytes) -> io::Result<()> {
        if !self.is_committed() {
            self.write_status(StatusCode::OK);
        }
        self.pending.extend_from_slice(&chunk);
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = self.pending.split().freeze();
        self.body_tx
            .send(Ok(chunk))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "caller went away"))
    }
}

impl PendingResponse {
    /// Wait for the head and build a response streaming the flushed chunks.
    ///
    /// A writer dropped before committing yields `502 Bad Gateway`.
    pub async fn into_response(self) -> Response {
        match self.head_rx.await {
            Ok((status, headers)) => {
                let mut response = Response::new(Body::from_stream(ReceiverStream::new(self.body_rx)));
                *response.status_mut() = status;
                *response.headers_mut() = headers;
                response
            }
            Err(_) => StatusCode::BAD_GATEWAY.into_response(),
        }
    }
}
