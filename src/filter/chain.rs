//! Filter chain execution with per-filter fault isolation.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::filter::{Filter, FilterContext};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Request,
    Response,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Request => "request",
            Phase::Response => "response",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run every filter's request hook in declared order.
///
/// Returns the number of filters that faulted.
pub fn run_request_phase(filters: &[Arc<dyn Filter>], ctx: &mut FilterContext<'_>) -> usize {
    let mut faults = 0;
    for filter in filters {
        if !apply_safe(filter.as_ref(), Phase::Request, ctx) {
            faults += 1;
        }
    }
    faults
}

/// Run every filter's response hook in reverse declared order.
///
/// Returns the number of filters that faulted.
pub fn run_response_phase(filters: &[Arc<dyn Filter>], ctx: &mut FilterContext<'_>) -> usize {
    let mut faults = 0;
    for filter in filters.iter().rev() {
        if !apply_safe(filter.as_ref(), Phase::Response, ctx) {
            faults += 1;
        }
    }
    faults
}

/// Invoke one hook behind a recovery boundary. Returns false on a fault.
fn apply_safe(filter: &dyn Filter, phase: Phase, ctx: &mut FilterContext<'_>) -> bool {
    let outcome = catch_unwind(AssertUnwindSafe(|| match phase {
        Phase::Request => filter.request(ctx),
        Phase::Response => filter.response(ctx),
    }));

    let fault = match outcome {
        Ok(Ok(())) => return true,
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    tracing::error!(
        kind = "FilterFault",
        filter = filter.id(),
        phase = %phase,
        error = %fault,
        "filter failed, continuing chain"
    );
    metrics::record_filter_fault(filter.id(), phase);
    false
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
