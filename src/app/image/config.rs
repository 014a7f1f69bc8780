//! Image loader configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::image;

/// Configuration for the image loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageLoaderConfig {
    /// Name of the disk cache directory under the internal cache root
    pub disk_cache_name: String,
    /// Disk cache size limit in bytes
    pub disk_cache_size_bytes: u64,
    /// Number of decoded images kept in memory
    pub memory_cache_entries: usize,
    /// Default per-request timeout
    #[serde(with = "humantime_serde")]
    pub load_timeout: Duration,
    /// Upper bound on concurrent fetch/decode work
    pub max_concurrent_fetches: usize,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            disk_cache_name: image::DISK_CACHE_NAME.to_string(),
            disk_cache_size_bytes: image::DISK_CACHE_SIZE_BYTES,
            memory_cache_entries: image::MEMORY_CACHE_ENTRIES,
            load_timeout: image::LOAD_TIMEOUT,
            max_concurrent_fetches: image::MAX_CONCURRENT_FETCHES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImageLoaderConfig::default();
        assert_eq!(config.disk_cache_name, "glideCache");
        assert_eq!(config.disk_cache_size_bytes, 20 * 1024 * 1024);
        assert_eq!(config.load_timeout, Duration::from_secs(30));
    }
}
