//! Per-request state shared by every filter of a route.

use axum::http::{request, response, Response};

use crate::proxy::writer::ResponseWriter;

/// Mutable record bound to one request's lifetime.
///
/// Holds the caller's output sink, the inbound request head, and the backend
/// response head once the round trip has completed. Bodies are not part of
/// the context; they are streamed by the proxy untouched.
pub struct FilterContext<'a> {
    writer: &'a mut dyn ResponseWriter,
    request: request::Parts,
    // Placeholder head until the backend responds.
    response: response::Parts,
    responded: bool,
}

impl<'a> FilterContext<'a> {
    pub fn new(writer: &'a mut dyn ResponseWriter, request: request::Parts) -> Self {
        Self {
            writer,
            request,
            response: Response::new(()).into_parts().0,
            responded: false,
        }
    }

    /// The caller's output sink.
    pub fn response_writer(&mut self) -> &mut dyn ResponseWriter {
        &mut *self.writer
    }

    pub fn request(&self) -> &request::Parts {
        &self.request
    }

    /// Request-phase filters rewrite the head that the backend request is
    /// built from.
    pub fn request_mut(&mut self) -> &mut request::Parts {
        &mut self.request
    }

    /// The backend response head; `None` during the request phase.
    pub fn response(&self) -> Option<&response::Parts> {
        self.responded.then_some(&self.response)
    }

    pub fn response_mut(&mut self) -> Option<&mut response::Parts> {
        if self.responded {
            Some(&mut self.response)
        } else {
            None
        }
    }

    /// Record the backend response. Happens exactly once per request.
    pub(crate) fn set_response(&mut self, response: response::Parts) {
        debug_assert!(!self.responded, "backend response set twice");
        self.response = response;
        self.responded = true;
    }

    /// Hand back the backend response head after the response phase.
    pub(crate) fn into_response(self) -> response::Parts {
        debug_assert!(self.responded, "response taken before it was set");
        self.response
    }
}
