//! Owned request and buffered response types passed through the interceptor chain

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Version};
use url::Url;

use crate::errors::{HttpError, HttpResult};

/// An HTTP request that interceptors can inspect and rebuild
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// GET request for `url`
    pub fn get(url: &str) -> HttpResult<Self> {
        Ok(Self::new(Method::GET, parse_url(url)?))
    }

    /// POST request with an `application/x-www-form-urlencoded` body
    pub fn post_form(url: &str, fields: &[(&str, &str)]) -> HttpResult<Self> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Self::new(Method::POST, parse_url(url)?)
            .header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")?
            .body(body.into_bytes());
        Ok(request)
    }

    /// Add or replace a header
    pub fn header(mut self, name: &str, value: &str) -> HttpResult<Self> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| HttpError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Set the request body
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the `Content-Type` header, if any
    pub fn content_type(&self) -> Option<&str> {
        content_type(&self.headers)
    }

    /// Value of a header as text, if present and valid UTF-8
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request{{method={}, url={}}}", self.method, self.url)
    }
}

/// A response whose body has been read into memory
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub version: Version,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Response with an empty body and no headers
    pub fn new(status: StatusCode, url: Url) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            url,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Value of the `Content-Type` header, if any
    pub fn content_type(&self) -> Option<&str> {
        content_type(&self.headers)
    }

    /// Value of a header as text, if present and valid UTF-8
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response{{protocol={:?}, code={}, message={}, url={}}}",
            self.version,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or(""),
            self.url
        )
    }
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

fn parse_url(url: &str) -> HttpResult<Url> {
    Url::parse(url).map_err(|e| HttpError::InvalidUrl {
        url: url.to_string(),
        error: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_parses_url() {
        let request = HttpRequest::get("https://example.com/a?b=1").unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.host_str(), Some("example.com"));
        assert!(request.body.is_none());

        assert!(matches!(
            HttpRequest::get("not a url"),
            Err(HttpError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_post_form_encodes_body() {
        let request = HttpRequest::post_form(
            "https://example.com/login",
            &[("login_name", "a b"), ("version", "1.0.1")],
        )
        .unwrap();
        assert_eq!(
            request.content_type(),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(
            request.body.as_deref(),
            Some("login_name=a+b&version=1.0.1".as_bytes())
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest::get("http://example.com")
            .unwrap()
            .header("logRequest", "false")
            .unwrap();
        assert_eq!(request.header_str("logrequest"), Some("false"));
        assert_eq!(request.header_str("LOGREQUEST"), Some("false"));
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let result = HttpRequest::get("http://example.com")
            .unwrap()
            .header("X-Test", "bad\nvalue");
        assert!(matches!(result, Err(HttpError::InvalidHeader { .. })));
    }

    #[test]
    fn test_response_display() {
        let response = HttpResponse::new(
            StatusCode::NOT_FOUND,
            Url::parse("http://example.com/x").unwrap(),
        );
        assert_eq!(
            response.to_string(),
            "Response{protocol=HTTP/1.1, code=404, message=Not Found, url=http://example.com/x}"
        );
        assert!(!response.is_success());
    }
}
