//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request head (host, path, method)
//!     → table.rs (route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → Return: matched Route or NoMatch
//!
//! Route Compilation (at startup and on reload):
//!     RouteConfig[]
//!     → Sort by priority
//!     → Compile matchers, backend URL, header filters
//!     → Freeze as immutable RouteTable, published as a settings snapshot
//! ```
//!
//! # Design Decisions
//! - Routes compiled once per snapshot, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by priority)

pub mod matcher;
pub mod route;
pub mod table;

pub use route::{Backend, Route};
pub use table::{RouteBuildError, RouteTable};
