//! Interceptor chain and the transport at its end
//!
//! An exchange runs through every interceptor in order. Each interceptor
//! receives the request and a [`Next`] handle; it may rewrite the request,
//! call `next.proceed(request)` to run the rest of the chain, and rewrite
//! the response on the way back. The last link is a [`Transport`].

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{HttpError, HttpResult};

use super::exchange::{HttpRequest, HttpResponse};

/// One link of the chain
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> HttpResult<HttpResponse>;
}

/// Sends a request over the wire (or fakes it, in tests)
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn send(&self, request: HttpRequest) -> HttpResult<HttpResponse>;
}

/// The remainder of the chain after the current interceptor
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(interceptors: &'a [Arc<dyn Interceptor>], transport: &'a dyn Transport) -> Self {
        Self {
            interceptors,
            transport,
        }
    }

    /// Run the rest of the chain
    pub async fn proceed(self, request: HttpRequest) -> HttpResult<HttpResponse> {
        match self.interceptors.split_first() {
            Some((current, rest)) => {
                current
                    .intercept(request, Next::new(rest, self.transport))
                    .await
            }
            None => self.transport.send(request).await,
        }
    }
}

/// Transport backed by a reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> HttpResult<HttpResponse> {
        let url = request.url.clone();
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| map_send_error(e, &url))?;

        let status = response.status();
        let version = response.version();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_send_error(e, &url))?
            .to_vec();

        tracing::trace!("Received {} ({} bytes) from {}", status, body.len(), final_url);

        Ok(HttpResponse {
            status,
            version,
            url: final_url,
            headers,
            body,
        })
    }
}

fn map_send_error(error: reqwest::Error, url: &url::Url) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout {
            url: url.to_string(),
        }
    } else {
        HttpError::Request(error)
    }
}
