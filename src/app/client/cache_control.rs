//! Network interceptor that makes request cache directives public on the response

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CACHE_CONTROL, PRAGMA};

use crate::errors::HttpResult;

use super::exchange::{HttpRequest, HttpResponse};
use super::interceptor::{Interceptor, Next};

/// Copies the request `Cache-Control` onto the response as `public, <value>`
///
/// Responses to requests without a `Cache-Control` header are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheControlRewrite;

#[async_trait]
impl Interceptor for CacheControlRewrite {
    async fn intercept(&self, request: HttpRequest, next: Next<'_>) -> HttpResult<HttpResponse> {
        let cache_control = request
            .header_str(CACHE_CONTROL.as_str())
            .filter(|v| !v.trim().is_empty())
            .map(str::to_owned);

        let mut response = next.proceed(request).await?;

        if let Some(cache_control) = cache_control {
            match HeaderValue::from_str(&format!("public, {}", cache_control)) {
                Ok(value) => {
                    response.headers.remove(PRAGMA);
                    response.headers.insert(CACHE_CONTROL, value);
                }
                Err(e) => tracing::warn!("Skipping cache-control rewrite: {}", e),
            }
        }
        Ok(response)
    }
}
