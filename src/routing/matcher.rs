//! Route matching logic.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive)
//! - Match path prefix (case-sensitive)
//! - Match request method against an allowed set
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive and ignores the port
//! - Path matching is case-sensitive
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::{header, request::Parts, Method};

/// Trait for matching request heads against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Parts) -> bool;
}

/// Matches the Host header, falling back to the URI authority for HTTP/2.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

fn request_host(req: &Parts) -> Option<&str> {
    req.headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri.authority().map(|a| a.as_str()))
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal, keep the brackets
        return host.split_once(']').map(|(h, _)| &host[..h.len() + 1]).unwrap_or(host);
    }
    host.split_once(':').map(|(h, _)| h).unwrap_or(host)
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Parts) -> bool {
        request_host(req)
            .map(|h| strip_port(h).eq_ignore_ascii_case(&self.expected_host))
            .unwrap_or(false)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Parts) -> bool {
        req.uri.path().starts_with(&self.prefix)
    }
}

/// Matches any of a set of methods.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Parts) -> bool {
        self.methods.contains(&req.method)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Parts) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}
