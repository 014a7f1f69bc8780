//! Error types for commonlib
//!
//! This module defines the error types for every component of the library.
//! Each component has its own enum so callers can match on exactly the
//! failures that component can produce; `AppError` aggregates them for the
//! CLI and for code that drives several components at once.

use std::path::PathBuf;
use thiserror::Error;

/// Grid spacing calculator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Column (or row, in the horizontal variant) count was zero or negative
    #[error("column count should be larger than 0, got {column_count}")]
    InvalidConfiguration { column_count: i32 },

    /// Item index outside `[0, item_count)`
    #[error("item index {index} out of range for {item_count} items")]
    IndexOutOfRange { index: i32, item_count: i32 },
}

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    /// The underlying reqwest client could not be built
    #[error("Failed to build HTTP client")]
    Build(#[source] reqwest::Error),

    /// Transport-level failure while executing a request
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    /// Request exceeded its timeout
    #[error("HTTP request to {url} timed out")]
    Timeout { url: String },

    /// Invalid URL provided
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Header name or value could not be encoded
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Request body could not be produced
    #[error("Invalid request body: {reason}")]
    Body { reason: String },
}

/// Image loading errors
#[derive(Error, Debug)]
pub enum ImageError {
    /// HTTP error fetching a remote image
    #[error("Image fetch failed")]
    Http(#[from] HttpError),

    /// Server answered with a non-success status
    #[error("Image fetch failed: HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// I/O error reading a local image or the disk cache
    #[error("Image I/O error for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes could not be decoded as an image
    #[error("Image decode failed for {path}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Load exceeded the configured timeout
    #[error("Image load timed out after {millis}ms: {path}")]
    Timeout { path: String, millis: u64 },

    /// Request was cancelled before it completed
    #[error("Image load cancelled: {path}")]
    Cancelled { path: String },

    /// Loader has been destroyed and accepts no new requests
    #[error("Image loader has been destroyed")]
    Destroyed,

    /// Blocking decode task failed
    #[error("Image decode task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Bitmap compression errors
#[derive(Error, Debug)]
pub enum CompressError {
    /// Encoder rejected the image
    #[error("Image encoding failed")]
    Encode(#[from] image::ImageError),

    /// Even the lowest quality exceeds the size limit
    #[error("Cannot compress below {limit_kb} KB, smallest achievable is {smallest_kb} KB")]
    SizeUnreachable { smallest_kb: u64, limit_kb: u64 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format in {path}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration could not be serialized
    #[error("Failed to serialize configuration")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error reading or writing the configuration file
    #[error("Configuration I/O error for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform has no user configuration directory
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Grid layout error
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// HTTP error
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Image loading error
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Compression error
    #[error(transparent)]
    Compress(#[from] CompressError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Http(HttpError::Request(_))
                | AppError::Http(HttpError::Timeout { .. })
                | AppError::Image(ImageError::Http(_))
                | AppError::Image(ImageError::Timeout { .. })
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Layout(_) => "layout",
            AppError::Http(_) => "http",
            AppError::Image(_) => "image",
            AppError::Compress(_) => "compress",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Layout result type alias
pub type LayoutResult<T> = std::result::Result<T, LayoutError>;

/// HTTP result type alias
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// Image result type alias
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Compression result type alias
pub type CompressResult<T> = std::result::Result<T, CompressError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
