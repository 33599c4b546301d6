//! Relay Proxy Library
//!
//! An HTTP reverse-proxy core: per-request route resolution against a
//! hot-swappable settings snapshot, fault-isolated header filters around a
//! single backend round trip, and incremental response streaming.

pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;
pub mod settings;

pub use config::schema::ProxyConfig;
pub use error::{FailureKind, ProxyError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{HttpTransport, Proxy, Transport};
pub use settings::{FileSource, Settings, SettingsHolder, SettingsSource};
