//! HTTP client service with an interceptor chain
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `exchange`: owned request and buffered response types
//! - `interceptor`: the `Interceptor`/`Transport` traits and the chain runner
//! - `logging`: request/response logging keyed on the `logRequest` header
//! - `cache_control`: response cache-control rewrite

use std::sync::Arc;

use reqwest::header::ACCEPT;

use crate::errors::HttpResult;

pub mod cache_control;
pub mod config;
pub mod exchange;
pub mod interceptor;
pub mod logging;

pub use cache_control::CacheControlRewrite;
pub use config::{ClientConfig, TlsPolicy};
pub use exchange::{HttpRequest, HttpResponse};
pub use interceptor::{Interceptor, Next, ReqwestTransport, Transport};
pub use logging::HttpLogInterceptor;

/// HTTP client shared by the rest of the library
///
/// Cheap to clone; clones share the connection pool and the chain.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ClientConfig,
    https_only: bool,
    chain: Vec<Arc<dyn Interceptor>>,
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    /// Client with the default chain, accepting `http` and `https` URLs
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Build` if the underlying client cannot be created
    pub fn new(config: ClientConfig) -> HttpResult<Self> {
        Self::builder(config).build()
    }

    /// Client with the default chain that refuses plain `http` URLs
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Build` if the underlying client cannot be created
    pub fn secure(config: ClientConfig) -> HttpResult<Self> {
        Self::builder(config).https_only(true).build()
    }

    pub fn builder(config: ClientConfig) -> HttpClientBuilder {
        HttpClientBuilder::new(config)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn is_https_only(&self) -> bool {
        self.inner.https_only
    }

    /// Number of interceptors in the chain
    pub fn interceptor_count(&self) -> usize {
        self.inner.chain.len()
    }

    /// Run a request through the chain
    ///
    /// Non-success statuses come back as responses.
    pub async fn execute(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
        Next::new(&self.inner.chain, self.inner.transport.as_ref())
            .proceed(request)
            .await
    }

    pub async fn get(&self, url: &str) -> HttpResult<HttpResponse> {
        self.execute(HttpRequest::get(url)?).await
    }

    /// GET and return the body as text
    pub async fn get_text(&self, url: &str) -> HttpResult<String> {
        let response = self.get(url).await?;
        Ok(response.text())
    }

    /// GET with an `Accept` header, returning the full response
    pub async fn get_bytes(&self, url: &str, accept: &str) -> HttpResult<HttpResponse> {
        let request = HttpRequest::get(url)?.header(ACCEPT.as_str(), accept)?;
        self.execute(request).await
    }

    /// POST `fields` as a form
    pub async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> HttpResult<HttpResponse> {
        self.execute(HttpRequest::post_form(url, fields)?).await
    }
}

/// Builder for [`HttpClient`]
///
/// Application interceptors run before network interceptors. Without any
/// explicit interceptor the chain is `HttpLogInterceptor`, then
/// `CacheControlRewrite`.
#[derive(Debug)]
pub struct HttpClientBuilder {
    config: ClientConfig,
    https_only: bool,
    interceptors: Vec<Arc<dyn Interceptor>>,
    network_interceptors: Vec<Arc<dyn Interceptor>>,
    transport: Option<Arc<dyn Transport>>,
    default_chain: bool,
}

impl HttpClientBuilder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            https_only: false,
            interceptors: Vec::new(),
            network_interceptors: Vec::new(),
            transport: None,
            default_chain: true,
        }
    }

    pub fn https_only(mut self, https_only: bool) -> Self {
        self.https_only = https_only;
        self
    }

    /// Add an application-level interceptor
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.default_chain = false;
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Add a network-level interceptor
    pub fn network_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.default_chain = false;
        self.network_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Replace the reqwest transport
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn build(self) -> HttpResult<HttpClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(
                self.config.build_http_client(self.https_only)?,
            )),
        };

        let mut chain = self.interceptors;
        let mut network = self.network_interceptors;
        if self.default_chain {
            chain.push(Arc::new(HttpLogInterceptor::with_response_logging(
                self.config.log_tag.clone(),
                self.config.log_response,
            )));
            network.push(Arc::new(CacheControlRewrite));
        }
        chain.append(&mut network);

        log_client(&self.config, self.https_only, chain.len());

        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                https_only: self.https_only,
                chain,
                transport,
            }),
        })
    }
}

fn log_client(config: &ClientConfig, https_only: bool, interceptors: usize) {
    tracing::debug!(
        tag = %config.log_tag,
        "client: connectTimeout:{:?}, readTimeout:{:?}, writeTimeout:{:?}, maxIdlePerHost:{}, keepAlive:{:?}, httpsOnly:{}, tls:{:?}, interceptors:{}",
        config.connect_timeout,
        config.read_timeout,
        config.write_timeout,
        config.pool_max_idle_per_host,
        config.pool_idle_timeout,
        https_only,
        config.tls,
        interceptors,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;

    #[derive(Debug)]
    struct Teapot;

    #[async_trait]
    impl Transport for Teapot {
        async fn send(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
            let mut response = HttpResponse::new(StatusCode::IM_A_TEAPOT, request.url);
            response.body = request
                .headers
                .get(ACCEPT)
                .map(|v| v.as_bytes().to_vec())
                .unwrap_or_default();
            Ok(response)
        }
    }

    #[test]
    fn test_default_chain() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        assert_eq!(client.interceptor_count(), 2);
        assert!(!client.is_https_only());
    }

    #[test]
    fn test_secure_client_is_https_only_and_strict() {
        let client = HttpClient::secure(ClientConfig::default()).unwrap();
        assert!(client.is_https_only());
        assert_eq!(client.config().tls, TlsPolicy::Strict);
    }

    #[test]
    fn test_explicit_interceptors_replace_default_chain() {
        let client = HttpClient::builder(ClientConfig::default())
            .interceptor(HttpLogInterceptor::new("custom"))
            .build()
            .unwrap();
        assert_eq!(client.interceptor_count(), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let client = HttpClient::builder(ClientConfig::default())
            .transport(Teapot)
            .build()
            .unwrap();
        let response = client.get("http://example.com/").await.unwrap();
        assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_get_bytes_sends_accept() {
        let client = HttpClient::builder(ClientConfig::default())
            .transport(Teapot)
            .build()
            .unwrap();
        let response = client
            .get_bytes("http://example.com/a.png", "image/*")
            .await
            .unwrap();
        assert_eq!(response.text(), "image/*");
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_transport() {
        let client = HttpClient::builder(ClientConfig::default())
            .transport(Teapot)
            .build()
            .unwrap();
        assert!(client.get_text("::nope::").await.is_err());
    }
}
