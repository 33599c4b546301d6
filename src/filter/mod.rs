//! Request/response filters.
//!
//! # Data Flow
//! ```text
//! route.filters = [f1, f2, f3]
//!
//! request phase:   f1.request → f2.request → f3.request
//!     → backend round trip
//! response phase:  f3.response → f2.response → f1.response
//! ```
//!
//! # Design Decisions
//! - Filters are opaque to the proxy: identified by `id()` only
//! - A failing filter loses its own mutation, never the request
//! - Filters see heads only; bodies stream through untouched

pub mod chain;
pub mod context;
pub mod header;

pub use chain::{run_request_phase, run_response_phase, Phase};
pub use context::FilterContext;
pub use header::HeaderFilter;

pub use crate::error::FilterError;

/// A unit of request/response transformation.
pub trait Filter: Send + Sync {
    /// Name used in logs and metrics.
    fn id(&self) -> &str;

    /// Observe or rewrite the request before it is sent to the backend.
    fn request(&self, _ctx: &mut FilterContext<'_>) -> Result<(), FilterError> {
        Ok(())
    }

    /// Observe or rewrite the backend response before it is streamed back.
    fn response(&self, _ctx: &mut FilterContext<'_>) -> Result<(), FilterError> {
        Ok(())
    }
}
