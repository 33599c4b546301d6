//! Header rewriting filters.
//!
//! A `HeaderFilter` acts in one phase only: request-phase filters rewrite the
//! headers forwarded to the backend, response-phase filters rewrite the
//! backend response headers before they are copied to the caller.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::schema::{FilterConfig, FilterPhase, HeaderAction};
use crate::filter::{Filter, FilterContext, FilterError};

#[derive(Debug, Clone)]
enum Op {
    Set(HeaderValue),
    Append(HeaderValue),
    Remove,
}

#[derive(Debug, Clone)]
pub struct HeaderFilter {
    id: String,
    phase: FilterPhase,
    name: HeaderName,
    op: Op,
}

impl HeaderFilter {
    pub fn set(phase: FilterPhase, name: HeaderName, value: HeaderValue) -> Self {
        Self::build(phase, name, Op::Set(value))
    }

    pub fn append(phase: FilterPhase, name: HeaderName, value: HeaderValue) -> Self {
        Self::build(phase, name, Op::Append(value))
    }

    pub fn remove(phase: FilterPhase, name: HeaderName) -> Self {
        Self::build(phase, name, Op::Remove)
    }

    fn build(phase: FilterPhase, name: HeaderName, op: Op) -> Self {
        let action = match op {
            Op::Set(_) => "set",
            Op::Append(_) => "append",
            Op::Remove => "remove",
        };
        let side = match phase {
            FilterPhase::Request => "request",
            FilterPhase::Response => "response",
        };
        Self {
            id: format!("{}-header-{}:{}", side, action, name),
            phase,
            name,
            op,
        }
    }

    /// Override the diagnostic id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Build from a route's filter entry. Validation has already checked
    /// names and values; this still reports them rather than panicking.
    pub fn from_config(config: &FilterConfig) -> Result<Self, String> {
        let name = HeaderName::from_bytes(config.name.as_bytes())
            .map_err(|_| format!("invalid header name '{}'", config.name))?;

        let value = || -> Result<HeaderValue, String> {
            let raw = config
                .value
                .as_deref()
                .ok_or_else(|| format!("header '{}' needs a value", config.name))?;
            HeaderValue::from_str(raw).map_err(|_| format!("invalid value for header '{}'", config.name))
        };

        let filter = match config.action {
            HeaderAction::Set => Self::set(config.phase, name, value()?),
            HeaderAction::Append => Self::append(config.phase, name, value()?),
            HeaderAction::Remove => Self::remove(config.phase, name),
        };

        Ok(match &config.id {
            Some(id) => filter.with_id(id.clone()),
            None => filter,
        })
    }

    fn apply(&self, headers: &mut HeaderMap) {
        match &self.op {
            Op::Set(value) => {
                headers.insert(self.name.clone(), value.clone());
            }
            Op::Append(value) => {
                headers.append(self.name.clone(), value.clone());
            }
            Op::Remove => {
                headers.remove(&self.name);
            }
        }
    }
}

impl Filter for HeaderFilter {
    fn id(&self) -> &str {
        &self.id
    }

    fn request(&self, ctx: &mut FilterContext<'_>) -> Result<(), FilterError> {
        if self.phase == FilterPhase::Request {
            self.apply(&mut ctx.request_mut().headers);
        }
        Ok(())
    }

    fn response(&self, ctx: &mut FilterContext<'_>) -> Result<(), FilterError> {
        if self.phase != FilterPhase::Response {
            return Ok(());
        }
        let response = ctx
            .response_mut()
            .ok_or_else(|| FilterError::new("no backend response to rewrite"))?;
        self.apply(&mut response.headers);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::writer::ChannelWriter;
    use axum::http::{Request, Response};

    fn name(s: &'static str) -> HeaderName {
        HeaderName::from_static(s)
    }

    #[test]
    fn test_request_append_keeps_existing_values() {
        let filter = HeaderFilter::append(FilterPhase::Request, name("x-req"), HeaderValue::from_static("2"));
        let (mut writer, _pending) = ChannelWriter::new(1);
        let (parts, _) = Request::builder().header("X-Req", "1").body(()).unwrap().into_parts();
        let mut ctx = FilterContext::new(&mut writer, parts);

        filter.request(&mut ctx).unwrap();
        filter.response(&mut ctx).unwrap();

        let values: Vec<_> = ctx.request().headers.get_all("x-req").iter().collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_response_set_and_remove() {
        let set = HeaderFilter::set(FilterPhase::Response, name("x-res"), HeaderValue::from_static("1"));
        let remove = HeaderFilter::remove(FilterPhase::Response, name("server"));

        let (mut writer, _pending) = ChannelWriter::new(1);
        let (parts, _) = Request::new(()).into_parts();
        let mut ctx = FilterContext::new(&mut writer, parts);
        let (response, _) = Response::builder()
            .header("Server", "backend")
            .header("X-Res", "0")
            .body(())
            .unwrap()
            .into_parts();
        ctx.set_response(response);

        set.response(&mut ctx).unwrap();
        remove.response(&mut ctx).unwrap();

        let headers = &ctx.response().unwrap().headers;
        assert_eq!(headers.get_all("x-res").iter().count(), 1);
        assert_eq!(headers["x-res"], "1");
        assert!(headers.get("server").is_none());
    }

    #[test]
    fn test_response_filter_without_response_faults() {
        let filter = HeaderFilter::remove(FilterPhase::Response, name("server"));
        let (mut writer, _pending) = ChannelWriter::new(1);
        let (parts, _) = Request::new(()).into_parts();
        let mut ctx = FilterContext::new(&mut writer, parts);

        assert!(filter.response(&mut ctx).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = FilterConfig {
            id: None,
            phase: FilterPhase::Request,
            action: HeaderAction::Set,
            name: "X-Env".into(),
            value: Some("prod".into()),
        };
        let filter = HeaderFilter::from_config(&config).unwrap();
        assert_eq!(filter.id(), "request-header-set:x-env");

        let named = FilterConfig {
            id: Some("tag-env".into()),
            ..config.clone()
        };
        assert_eq!(HeaderFilter::from_config(&named).unwrap().id(), "tag-env");

        let missing = FilterConfig { value: None, ..config };
        assert!(HeaderFilter::from_config(&missing).is_err());
    }
}
