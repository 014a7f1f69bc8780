//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the reqwest
//! client that sits at the end of the interceptor chain.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::{http, logging};
use crate::errors::{HttpError, HttpResult};

/// Certificate validation policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Validate server certificates and host names against the system roots
    #[default]
    Strict,
    /// Accept any certificate and host name. Test environments only.
    #[cfg(any(test, feature = "danger-insecure-tls"))]
    AcceptInvalidCerts,
}

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Read timeout
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
    /// Write timeout; reqwest has a single request timeout, which is set to
    /// the larger of the read and write timeouts
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,
    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// Connection pool idle timeout
    #[serde(with = "humantime_serde")]
    pub pool_idle_timeout: Duration,
    /// TCP keep-alive settings
    #[serde(default, with = "humantime_serde")]
    pub tcp_keepalive: Option<Duration>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Maximum redirects to follow (0 disables redirects)
    pub max_redirects: usize,
    /// Tag the logging interceptor logs under
    pub log_tag: String,
    /// Log responses as well as requests
    pub log_response: bool,
    /// Refuse anything below TLS 1.2
    pub min_tls_1_2: bool,
    /// Certificate validation policy
    #[serde(default)]
    pub tls: TlsPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: http::CONNECT_TIMEOUT,
            read_timeout: http::READ_TIMEOUT,
            write_timeout: http::WRITE_TIMEOUT,
            pool_max_idle_per_host: http::POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: http::POOL_IDLE_TIMEOUT,
            tcp_keepalive: Some(http::TCP_KEEPALIVE),
            user_agent: http::USER_AGENT.to_string(),
            max_redirects: http::MAX_REDIRECTS,
            log_tag: logging::CLIENT_TAG.to_string(),
            log_response: true,
            min_tls_1_2: true,
            tls: TlsPolicy::Strict,
        }
    }
}

impl ClientConfig {
    /// Default configuration that accepts self-signed certificates
    #[cfg(any(test, feature = "danger-insecure-tls"))]
    pub fn insecure_for_tests() -> Self {
        Self {
            tls: TlsPolicy::AcceptInvalidCerts,
            ..Default::default()
        }
    }

    /// Timeout applied to a whole request
    pub fn request_timeout(&self) -> Duration {
        self.read_timeout.max(self.write_timeout)
    }

    /// Builds the reqwest client with the specified configuration
    ///
    /// # Arguments
    ///
    /// * `https_only` - Reject plain `http://` URLs
    pub fn build_http_client(&self, https_only: bool) -> HttpResult<Client> {
        let redirect = if self.max_redirects == 0 {
            reqwest::redirect::Policy::none()
        } else {
            reqwest::redirect::Policy::limited(self.max_redirects)
        };

        let mut client_builder = Client::builder()
            .timeout(self.request_timeout())
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str())
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout)
            .redirect(redirect)
            .https_only(https_only);

        // Configure TCP keep-alive if specified
        if let Some(keepalive) = self.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(keepalive);
        }

        if self.min_tls_1_2 {
            client_builder = client_builder.min_tls_version(reqwest::tls::Version::TLS_1_2);
        }

        match self.tls {
            TlsPolicy::Strict => {}
            #[cfg(any(test, feature = "danger-insecure-tls"))]
            TlsPolicy::AcceptInvalidCerts => {
                tracing::warn!("TLS certificate validation disabled for this client");
                client_builder = client_builder
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true);
            }
        }

        client_builder.build().map_err(HttpError::Build)
    }
}
