//! Live routing settings.
//!
//! # Data Flow
//! ```text
//! SettingsSource (static value, watched file, ...)
//!     → holder.publish(settings)      single writer, atomic swap
//!     → holder.current()              lock-free, many readers
//!     → one snapshot per request, resolved once
//! ```
//!
//! # Design Decisions
//! - Reading never blocks and never consumes an update
//! - Before the first publish every request fails fast instead of waiting
//! - A request keeps the `Arc<Route>` it resolved; later swaps cannot change it

pub mod holder;
pub mod source;

use std::sync::Arc;

use axum::http::request::Parts;

use crate::error::BoxError;
use crate::routing::Route;

pub use holder::{SettingsHolder, Snapshot};
pub use source::{FileSource, SettingsSource, SourceError, StaticSource, Subscription};

/// An immutable routing configuration.
///
/// Matching policy belongs to the implementation. `Ok(None)` means no route
/// matched; `Err` is an internal matching failure.
pub trait Settings: Send + Sync {
    fn route(&self, request: &Parts) -> Result<Option<Arc<Route>>, BoxError>;
}
