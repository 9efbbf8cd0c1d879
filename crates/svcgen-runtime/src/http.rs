//! Request, response and pipeline types used by generated clients.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::PipelineError;

/// Characters left untouched when encoding a URL component (RFC 3986 unreserved)
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a single URL component
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// HTTP verbs supported by generated methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Returns the verb as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered collection of request or response headers.
///
/// Names compare case-insensitively on lookup; insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header; an existing header with the same name is kept
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Replace every header with this name by a single value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
        self
    }

    /// First value for the header name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A request built by a generated method and handed to the pipeline
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: HttpMethod,
    url: String,
    query: Vec<(String, String)>,
    headers: HttpHeaders,
    body: Option<Vec<u8>>,
    content_type: Option<String>,
}

impl HttpRequest {
    /// Create a request for a verb and a resolved host/path
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: HttpHeaders::new(),
            body: None,
            content_type: None,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The host/path without query string
    pub fn path(&self) -> &str {
        &self.url
    }

    /// The full URL including any query parameters
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query)
    }

    /// Append a query parameter.
    ///
    /// `encoded` marks the value as already percent-encoded; otherwise it is
    /// encoded here. Keys are always encoded.
    pub fn add_query_param(&mut self, key: &str, value: impl AsRef<str>, encoded: bool) {
        let value = value.as_ref();
        let value = if encoded {
            value.to_string()
        } else {
            encode_component(value)
        };
        self.query.push((encode_component(key), value));
    }

    /// Query pairs in insertion order, as they will appear on the wire
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    pub fn set_headers(&mut self, headers: HttpHeaders) {
        self.headers = headers;
    }

    /// Set the body and record its declared content type
    pub fn set_body(&mut self, body: Vec<u8>, content_type: &str) {
        self.body = Some(body);
        self.content_type = Some(content_type.to_string());
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// A response returned by the pipeline
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    status: u16,
    headers: HttpHeaders,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// Transport pipeline a generated client sends its requests through.
///
/// Retry, authentication, timeouts and cancellation all belong to the
/// implementation; generated code only calls [`HttpPipeline::send`].
pub trait HttpPipeline: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, PipelineError>;
}

impl<F> HttpPipeline for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, PipelineError> + Send + Sync,
{
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, PipelineError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_are_encoded_unless_marked() {
        let mut request = HttpRequest::new(HttpMethod::Get, "https://example.com/keys");
        request.add_query_param("q", "a b&c", false);
        request.add_query_param("raw", "x%20y", true);
        assert_eq!(
            request.url(),
            "https://example.com/keys?q=a%20b%26c&raw=x%20y"
        );
    }

    #[test]
    fn test_url_appends_to_existing_query() {
        let mut request = HttpRequest::new(HttpMethod::Get, "/keys?api-version=1");
        request.add_query_param("q", "x", false);
        assert_eq!(request.url(), "/keys?api-version=1&q=x");
    }

    #[test]
    fn test_headers_case_insensitive_lookup() {
        let mut headers = HttpHeaders::new();
        headers.add("Content-Type", "text/plain");
        headers.add("x-ms-version", "1");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        headers.set("X-MS-VERSION", "2");
        assert_eq!(headers.get("x-ms-version"), Some("2"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_closure_pipeline() {
        let pipeline = |request: HttpRequest| -> Result<HttpResponse, PipelineError> {
            assert_eq!(request.method(), HttpMethod::Delete);
            Ok(HttpResponse::new(204))
        };
        let response = pipeline
            .send(HttpRequest::new(HttpMethod::Delete, "/keys/1"))
            .unwrap();
        assert_eq!(response.status_code(), 204);
    }
}
