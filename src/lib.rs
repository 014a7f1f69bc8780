//! commonlib
//!
//! Shared utilities for list and grid rendering clients: item spacing for
//! grids, an HTTP client with request logging, an image loader with memory
//! and disk caches, bitmap compression and cache directory helpers.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
