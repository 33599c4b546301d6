//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, tracing)
//!     → proxy::Proxy (resolve, filter, dispatch, stream)
//!     → Send to client
//! ```

pub mod server;

pub use server::HttpServer;
