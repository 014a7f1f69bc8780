//! Configuration management for commonlib
//!
//! This module provides TOML configuration with a fixed search order, a
//! commented default file and zero-config defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::client::ClientConfig;
use crate::app::dirs::CacheDirs;
use crate::app::image::ImageLoaderConfig;
use crate::constants::{config as config_constants, dirs as dir_constants, http, image, logging};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Debug flag holder
    pub debug: DebugConfig,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Image loader settings
    pub image: ImageConfigToml,
    /// Cache directory roots
    pub dirs: DirsConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Debug switch; selects the external cache root and chattier logging
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: config_constants::DEBUG_DEFAULT,
        }
    }
}

/// TOML-friendly client configuration
///
/// Certificate validation is always strict for clients built from a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    /// TCP keep-alive in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// Overrides the default user agent
    pub user_agent: Option<String>,
    pub max_redirects: usize,
    /// Tag the logging interceptor logs under
    pub log_tag: String,
    pub log_response: bool,
    pub min_tls_1_2: bool,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            read_timeout_secs: http::READ_TIMEOUT.as_secs(),
            write_timeout_secs: http::WRITE_TIMEOUT.as_secs(),
            pool_max_idle_per_host: http::POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout_secs: http::POOL_IDLE_TIMEOUT.as_secs(),
            tcp_keepalive_secs: Some(http::TCP_KEEPALIVE.as_secs()),
            user_agent: None,
            max_redirects: http::MAX_REDIRECTS,
            log_tag: logging::CLIENT_TAG.to_string(),
            log_response: true,
            min_tls_1_2: true,
        }
    }
}

/// TOML-friendly image loader configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfigToml {
    pub disk_cache_name: String,
    pub disk_cache_size_mb: u64,
    pub memory_cache_entries: usize,
    pub load_timeout_ms: u64,
    pub max_concurrent_fetches: usize,
}

impl Default for ImageConfigToml {
    fn default() -> Self {
        Self {
            disk_cache_name: image::DISK_CACHE_NAME.to_string(),
            disk_cache_size_mb: image::DISK_CACHE_SIZE_BYTES / (1024 * 1024),
            memory_cache_entries: image::MEMORY_CACHE_ENTRIES,
            load_timeout_ms: image::LOAD_TIMEOUT.as_millis() as u64,
            max_concurrent_fetches: image::MAX_CONCURRENT_FETCHES,
        }
    }
}

/// TOML-friendly cache directory configuration
///
/// Unset roots are derived from the platform directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirsConfigToml {
    pub package_name: String,
    pub internal_cache_root: Option<PathBuf>,
    pub external_cache_root: Option<PathBuf>,
    pub external_storage_root: Option<PathBuf>,
}

impl Default for DirsConfigToml {
    fn default() -> Self {
        Self {
            package_name: dir_constants::APP_DIR_NAME.to_string(),
            internal_cache_root: None,
            external_cache_root: None,
            external_storage_root: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
            colored_output: true,
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (ClientConfig, ImageLoaderConfig, CacheDirs) {
        (
            self.client.to_runtime_config(),
            self.image.to_runtime_config(),
            self.dirs.to_runtime_config(self.debug.enabled),
        )
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Otherwise the first file found in the
    /// standard locations is used, or the defaults when there is none.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file(),
        };

        match config_path {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                Self::load_from_file(&path).await
            }
            None => Ok(Self::default()),
        }
    }

    /// Write the commented default configuration to `path`
    pub async fn write_default(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Render this configuration as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(config_constants::LOCAL_FILE_NAME)];
        if let Ok(user) = Self::get_default_config_path() {
            search_paths.push(user);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = ::dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(dir_constants::APP_DIR_NAME)
            .join(config_constants::USER_FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig =
            toml::from_str(&content).map_err(|source| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        let defaults = ClientConfigToml::default();
        let image_defaults = ImageConfigToml::default();

        format!(
            r#"# commonlib configuration
# This file was automatically generated.
# You can customize any of these settings to suit your needs.

[debug]
# Debug mode puts caches under the external cache root
enabled = {}

[client]
# HTTP client settings
connect_timeout_secs = {}
read_timeout_secs = {}
write_timeout_secs = {}
pool_max_idle_per_host = {}
pool_idle_timeout_secs = {}
tcp_keepalive_secs = {}
max_redirects = {}
# user_agent = "my-app/1.0"

# Request/response logging
log_tag = "{}"
log_response = {}
min_tls_1_2 = {}

[image]
# Image loader settings
disk_cache_name = "{}"
disk_cache_size_mb = {}
memory_cache_entries = {}
load_timeout_ms = {}
max_concurrent_fetches = {}

[dirs]
# Cache directory roots (leave unset to use system defaults)
package_name = "{}"
# internal_cache_root = "/path/to/cache"
# external_cache_root = "/path/to/external/cache"
# external_storage_root = "/path/to/storage"

[logging]
# Logging configuration
level = "{}"  # error, warn, info, debug, trace
colored_output = true
"#,
            config_constants::DEBUG_DEFAULT,
            defaults.connect_timeout_secs,
            defaults.read_timeout_secs,
            defaults.write_timeout_secs,
            defaults.pool_max_idle_per_host,
            defaults.pool_idle_timeout_secs,
            http::TCP_KEEPALIVE.as_secs(),
            defaults.max_redirects,
            defaults.log_tag,
            defaults.log_response,
            defaults.min_tls_1_2,
            image_defaults.disk_cache_name,
            image_defaults.disk_cache_size_mb,
            image_defaults.memory_cache_entries,
            image_defaults.load_timeout_ms,
            image_defaults.max_concurrent_fetches,
            dir_constants::APP_DIR_NAME,
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            read_timeout: Duration::from_secs(self.read_timeout_secs),
            write_timeout: Duration::from_secs(self.write_timeout_secs),
            pool_max_idle_per_host: self.pool_max_idle_per_host,
            pool_idle_timeout: Duration::from_secs(self.pool_idle_timeout_secs),
            tcp_keepalive: self.tcp_keepalive_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            max_redirects: self.max_redirects,
            log_tag: self.log_tag.clone(),
            log_response: self.log_response,
            min_tls_1_2: self.min_tls_1_2,
            tls: defaults.tls,
        }
    }
}

impl ImageConfigToml {
    /// Convert to runtime ImageLoaderConfig
    pub fn to_runtime_config(&self) -> ImageLoaderConfig {
        ImageLoaderConfig {
            disk_cache_name: self.disk_cache_name.clone(),
            disk_cache_size_bytes: self.disk_cache_size_mb * 1024 * 1024,
            memory_cache_entries: self.memory_cache_entries,
            load_timeout: Duration::from_millis(self.load_timeout_ms),
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

impl DirsConfigToml {
    /// Resolve the cache directory roots
    pub fn to_runtime_config(&self, debug: bool) -> CacheDirs {
        let system = CacheDirs::from_system(&self.package_name, debug);
        CacheDirs::new(
            self.internal_cache_root
                .clone()
                .unwrap_or_else(|| system.internal_cache_root().to_path_buf()),
            self.external_cache_root
                .clone()
                .or_else(|| system.external_cache_root().map(Path::to_path_buf)),
            self.external_storage_root
                .clone()
                .or_else(|| system.external_storage_root().map(Path::to_path_buf)),
            self.package_name.clone(),
            debug,
        )
    }
}
