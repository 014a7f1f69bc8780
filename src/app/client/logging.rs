//! Request/response logging interceptor
//!
//! 1. Requests are logged by default.
//! 2. Responses are logged when `log_response` is set.
//! 3. A request carrying the header `logRequest: false` is sent without the
//!    header and nothing about the exchange is logged.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::header::HeaderMap;
use tracing::{debug, error};

use crate::constants::logging;
use crate::errors::HttpResult;

use super::exchange::{HttpRequest, HttpResponse};
use super::interceptor::{Interceptor, Next};

/// Logs each exchange under a tag
#[derive(Debug, Clone)]
pub struct HttpLogInterceptor {
    tag: String,
    log_response: bool,
}

impl HttpLogInterceptor {
    /// Interceptor that logs requests and responses
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_response_logging(tag, true)
    }

    /// Interceptor that logs requests, and responses if `log_response`
    pub fn with_response_logging(tag: impl Into<String>, log_response: bool) -> Self {
        let tag = tag.into();
        let tag = if tag.is_empty() {
            logging::DEFAULT_TAG.to_string()
        } else {
            tag
        };
        Self { tag, log_response }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn logs_response(&self) -> bool {
        self.log_response
    }

    fn log_request(&self, request: &HttpRequest, start_millis: i64) {
        let content_type = request.content_type();
        let body = match (&request.body, content_type) {
            (Some(bytes), Some(ct)) if is_text(ct) => {
                let decoded = url_decode(&String::from_utf8_lossy(bytes));
                (!decoded.is_empty()).then_some(decoded)
            }
            (Some(_), Some(_)) => Some(logging::NON_TEXT_BODY.to_string()),
            _ => None,
        };

        debug!(
            tag = %self.tag,
            "\n========request start======>>> {}\nrequestStr:{}\ncontentType:{}\nrequestBody:{}\nrequestHeaders:{}\n========request end=========",
            start_millis,
            url_decode(&request.to_string()),
            content_type.unwrap_or(logging::UNKNOWN_CONTENT_TYPE),
            body.as_deref().unwrap_or("null"),
            headers_to_string(&request.headers),
        );
    }

    fn log_response(&self, response: &HttpResponse, start_millis: i64) {
        let content_type = response.content_type();
        let body = match content_type {
            Some(ct) if is_text(ct) => Some(String::from_utf8_lossy(&response.body).into_owned()),
            Some(_) => Some(logging::NON_TEXT_BODY.to_string()),
            None => None,
        };
        let end_millis = chrono::Utc::now().timestamp_millis();

        debug!(
            tag = %self.tag,
            "\n<<<=====response start========= {}\nresponseStr:{}\ncontentType:{}\nresponseHeaders:{}\nresponseBody:{}\nstartTimeMillis:{}, endTimeMillis:{}, take:{}(ms)\n========response end=========",
            start_millis,
            url_decode(&response.to_string()),
            content_type.unwrap_or(logging::UNKNOWN_CONTENT_TYPE),
            headers_to_string(&response.headers),
            body.as_deref().unwrap_or("null"),
            start_millis,
            end_millis,
            end_millis - start_millis,
        );
    }
}

#[async_trait]
impl Interceptor for HttpLogInterceptor {
    async fn intercept(
        &self,
        mut request: HttpRequest,
        next: Next<'_>,
    ) -> HttpResult<HttpResponse> {
        let start_millis = chrono::Utc::now().timestamp_millis();

        let silenced = request
            .header_str(logging::LOG_REQUEST_KEY)
            .is_some_and(|v| v.eq_ignore_ascii_case("false"));
        if silenced {
            // The flag is for this interceptor only; the server never sees it.
            request.headers.remove(logging::LOG_REQUEST_KEY);
            return next.proceed(request).await;
        }

        self.log_request(&request, start_millis);

        let response = match next.proceed(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(tag = %self.tag, "Exception e:{}", e);
                return Err(e);
            }
        };

        if self.log_response {
            self.log_response(&response, start_millis);
        } else {
            debug!(
                tag = %self.tag,
                "logResponse:{}, will not log the response", self.log_response
            );
        }
        Ok(response)
    }
}

/// Whether a body with this content type is worth printing
pub fn is_text(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    kind == "text" || logging::TEXT_SUBTYPES.contains(&subtype)
}

/// Decode `application/x-www-form-urlencoded` text for display
pub fn url_decode(input: &str) -> String {
    let plus_as_space = input.replace('+', " ");
    percent_decode_str(&plus_as_space)
        .decode_utf8_lossy()
        .into_owned()
}

/// Render headers as `name:value, ` pairs
pub fn headers_to_string(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            format!(
                "{}:{}, ",
                name,
                String::from_utf8_lossy(value.as_bytes())
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::interceptor::Transport;
    use reqwest::header::HeaderValue;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct CapturingTransport {
        seen: Mutex<Vec<HttpRequest>>,
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        async fn send(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
            let url = request.url.clone();
            self.seen.lock().unwrap().push(request);
            let mut response = HttpResponse::new(StatusCode::OK, url);
            response
                .headers
                .insert("content-type", HeaderValue::from_static("application/json"));
            response.body = br#"{"ok":true}"#.to_vec();
            Ok(response)
        }
    }

    async fn run(interceptor: HttpLogInterceptor, request: HttpRequest) -> (HttpResponse, HttpRequest) {
        let transport = CapturingTransport::default();
        let chain: Vec<Arc<dyn Interceptor>> = vec![Arc::new(interceptor)];
        let response = Next::new(&chain, &transport).proceed(request).await.unwrap();
        let seen = transport.seen.lock().unwrap().pop().unwrap();
        (response, seen)
    }

    #[test]
    fn test_empty_tag_falls_back() {
        assert_eq!(HttpLogInterceptor::new("").tag(), "OkHttpUtils");
        assert_eq!(HttpLogInterceptor::new("api").tag(), "api");
        assert!(HttpLogInterceptor::new("api").logs_response());
        assert!(!HttpLogInterceptor::with_response_logging("api", false).logs_response());
    }

    #[test]
    fn test_text_detection() {
        assert!(is_text("text/plain"));
        assert!(is_text("text/html; charset=utf-8"));
        assert!(is_text("application/json"));
        assert!(is_text("application/xml"));
        assert!(is_text("application/x-www-form-urlencoded"));
        assert!(is_text("application/webviewhtml"));
        assert!(is_text("Application/JSON"));
        assert!(!is_text("image/png"));
        assert!(!is_text("multipart/form-data; boundary=x"));
        assert!(!is_text("application/octet-stream"));
        assert!(!is_text("garbage"));
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(
            url_decode("platform=android&login_name=a%20b+c"),
            "platform=android&login_name=a b c"
        );
        assert_eq!(url_decode("%E4%B8%AD"), "中");
    }

    #[test]
    fn test_headers_to_string() {
        let mut headers = HeaderMap::new();
        headers.insert("user-agent", HeaderValue::from_static("mvp"));
        assert_eq!(headers_to_string(&headers), "user-agent:mvp, ");
        assert_eq!(headers_to_string(&HeaderMap::new()), "");
    }

    #[tokio::test]
    async fn test_silenced_request_loses_flag() {
        let request = HttpRequest::get("http://example.com/a")
            .unwrap()
            .header("logRequest", "FALSE")
            .unwrap()
            .header("X-Other", "1")
            .unwrap();

        let (response, seen) = run(HttpLogInterceptor::new("t"), request).await;
        assert!(response.is_success());
        assert!(seen.header_str("logRequest").is_none());
        assert_eq!(seen.header_str("X-Other"), Some("1"));
    }

    #[tokio::test]
    async fn test_logged_request_passes_through_untouched() {
        let request = HttpRequest::post_form("http://example.com/a", &[("k", "v")])
            .unwrap()
            .header("logRequest", "true")
            .unwrap();

        let (response, seen) = run(HttpLogInterceptor::new("t"), request).await;
        assert_eq!(response.text(), r#"{"ok":true}"#);
        assert_eq!(seen.header_str("logRequest"), Some("true"));
        assert_eq!(seen.body.as_deref(), Some("k=v".as_bytes()));
    }

    #[tokio::test]
    async fn test_response_body_survives_logging() {
        let request = HttpRequest::get("http://example.com/a").unwrap();
        let (response, _) = run(HttpLogInterceptor::with_response_logging("t", false), request).await;
        assert_eq!(response.body, br#"{"ok":true}"#.to_vec());
    }
}
