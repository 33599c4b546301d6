//! The request-handling core.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → resolver.rs  (snapshot → route)
//!     → filter chain, request phase
//!     → mapper.rs    (outbound request: backend URL, cloned headers, same body)
//!     → transport.rs (round trip on the shared client)
//!     → filter chain, response phase
//!     → streamer.rs  (headers, status, body in flushed pieces)
//!     → writer.rs    (caller sink backing the axum response)
//! ```

pub mod handler;
pub mod headers;
pub mod mapper;
pub mod resolver;
pub mod streamer;
pub mod transport;
pub mod writer;

pub use handler::Proxy;
pub use streamer::{StreamStats, DEFAULT_BUFFER_SIZE, DEFAULT_CHANNEL_CAPACITY};
pub use transport::{HttpTransport, Transport};
pub use writer::{ChannelWriter, PendingResponse, ResponseWriter};
