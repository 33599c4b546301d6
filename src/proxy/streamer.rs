//! Copying the backend response to the caller.
//!
//! Headers first (replace-per-name), then the status, then the body in
//! pieces of at most `buffer_size` bytes with a flush after every piece so
//! that chunked and event-stream responses reach the caller incrementally.

use axum::body::Body;
use axum::http::{response, Response};
use bytes::Bytes;
use http_body_util::BodyExt;

use crate::error::StreamError;
use crate::proxy::headers::copy_headers;
use crate::proxy::writer::ResponseWriter;

/// Default largest piece written to the caller at once.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default number of flushed pieces queued towards a slow caller.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4;

/// What reached the caller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes: u64,
    pub flushes: u64,
}

/// Stream `response` to `writer`.
pub async fn stream<W>(writer: &mut W, response: Response<Body>, buffer_size: usize) -> Result<StreamStats, StreamError>
where
    W: ResponseWriter + ?Sized,
{
    let (head, body) = response.into_parts();
    write_head(writer, &head);
    copy_body(writer, body, buffer_size, &mut StreamStats::default()).await
}

/// Copy the response headers into the writer and commit the status.
pub fn write_head<W>(writer: &mut W, head: &response::Parts)
where
    W: ResponseWriter + ?Sized,
{
    copy_headers(writer.headers_mut(), &head.headers);
    writer.write_status(head.status);
}

/// Copy the body until end of stream or the first error.
///
/// `stats` is updated as bytes are flushed so a caller still knows how much
/// was delivered when an error is returned. The body is dropped, releasing
/// the backend connection, on every exit path.
pub async fn copy_body<W>(
    writer: &mut W,
    mut body: Body,
    buffer_size: usize,
    stats: &mut StreamStats,
) -> Result<StreamStats, StreamError>
where
    W: ResponseWriter + ?Sized,
{
    let buffer_size = buffer_size.max(1);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| StreamError::Read(e.into()))?;
        let Ok(mut data) = frame.into_data() else {
            // Trailers are not forwarded.
            continue;
        };

        while !data.is_empty() {
            let piece: Bytes = data.split_to(data.len().min(buffer_size));
            let len = piece.len() as u64;
            writer.write(piece).await.map_err(StreamError::Write)?;
            writer.flush().await.map_err(StreamError::Write)?;
            stats.bytes += len;
            stats.flushes += 1;
        }
    }

    Ok(*stats)
}
