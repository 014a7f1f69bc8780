//! Application constants for commonlib
//!
//! This module centralizes all constants used throughout the library,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("commonlib/", env!("CARGO_PKG_VERSION"));

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(45);

    /// Read timeout (applied as the whole-request timeout)
    pub const READ_TIMEOUT: Duration = Duration::from_secs(45);

    /// Write timeout
    pub const WRITE_TIMEOUT: Duration = Duration::from_secs(45);

    /// Maximum idle connections kept per host
    pub const POOL_MAX_IDLE_PER_HOST: usize = 6;

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(6 * 60);

    /// TCP keep-alive interval
    pub const TCP_KEEPALIVE: Duration = Duration::from_secs(30);

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;
}

/// Request/response logging interceptor constants
pub mod logging {
    /// Request header that switches logging off for one exchange when set to "false"
    pub const LOG_REQUEST_KEY: &str = "logRequest";

    /// Tag used when an interceptor is created with an empty tag
    pub const DEFAULT_TAG: &str = "OkHttpUtils";

    /// Tag the default client chain logs under
    pub const CLIENT_TAG: &str = "OkHttp3Log";

    /// Logged in place of bodies that are not textual
    pub const NON_TEXT_BODY: &str = "requestBody maybe [file part] , too large too print , ignored!";

    /// Content type logged when none is known
    pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";

    /// Media subtypes treated as text
    pub const TEXT_SUBTYPES: &[&str] = &["json", "xml", "html", "webviewhtml", "x-www-form-urlencoded"];

    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

/// Cache directory names
pub mod dirs {
    /// Data cache subdirectory
    pub const DIR_DATAS: &str = "datas";

    /// Image cache subdirectory
    pub const DIR_IMAGES: &str = "images";

    /// Log subdirectory
    pub const DIR_LOGS: &str = "logs";

    /// Temporary files subdirectory
    pub const DIR_TMP: &str = "tmp";

    /// Application directory name under the platform config/cache roots
    pub const APP_DIR_NAME: &str = "commonlib";
}

/// Image loader constants
pub mod image {
    use super::Duration;

    /// Disk cache directory name under the internal cache root
    pub const DISK_CACHE_NAME: &str = "glideCache";

    /// Disk cache size limit (20MB)
    pub const DISK_CACHE_SIZE_BYTES: u64 = 20 * 1024 * 1024;

    /// Decoded images kept in memory
    pub const MEMORY_CACHE_ENTRIES: usize = 64;

    /// Per-request load timeout
    pub const LOAD_TIMEOUT: Duration = Duration::from_millis(30_000);

    /// Concurrent fetches allowed per loader
    pub const MAX_CONCURRENT_FETCHES: usize = 4;

    /// Thumbnail multiplier used by gallery loads
    pub const GALLERY_THUMBNAIL: f32 = 0.2;

    /// Placeholder shown while a default load is in flight
    pub const PLACEHOLDER_TRANSPARENT: &str = "color/transparent";

    /// Resource shown when a load fails
    pub const PHOTO_LOADING_ERROR: &str = "mipmap/photo_loading_error";

    /// Accept header sent with remote image fetches
    pub const ACCEPT: &str = "image/jpeg,image/png,image/gif,image/webp,image/bmp";
}

/// Bitmap compression constants
pub mod bitmap {
    /// First JPEG quality tried when a size limit is set
    pub const START_QUALITY: u8 = 100;

    /// Quality decrement between attempts
    pub const QUALITY_STEP: u8 = 10;

    /// Lowest JPEG quality tried
    pub const MIN_QUALITY: u8 = 10;
}

/// Configuration file constants
pub mod config {
    /// Project-local config file name
    pub const LOCAL_FILE_NAME: &str = "commonlib.toml";

    /// Config file name inside the user config directory
    pub const USER_FILE_NAME: &str = "config.toml";

    /// Debug mode default
    pub const DEBUG_DEFAULT: bool = true;
}

// Re-export commonly used constants for convenience
pub use http::USER_AGENT;
pub use logging::LOG_REQUEST_KEY;
