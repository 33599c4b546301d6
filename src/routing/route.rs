//! Routes and backend targets.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::filter::Filter;

/// An addressable backend endpoint: the absolute URL requests are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    url: Url,
}

impl Backend {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self::new)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A backend target plus its ordered filter list. Immutable once built.
pub struct Route {
    name: String,
    backend: Option<Backend>,
    filters: Vec<Arc<dyn Filter>>,
}

impl Route {
    pub fn new(name: impl Into<String>, backend: Option<Backend>) -> Self {
        Self {
            name: name.into(),
            backend,
            filters: Vec::new(),
        }
    }

    /// Append a filter; filters run in the order they are added.
    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_ref()
    }

    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("backend", &self.backend.as_ref().map(|b| b.url.as_str()))
            .field("filters", &self.filters.iter().map(|f| f.id()).collect::<Vec<_>>())
            .finish()
    }
}
