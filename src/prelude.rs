//! Prelude module for commonlib
//!
//! Re-exports the most commonly used items so that typical usage needs a
//! single `use commonlib::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use commonlib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let spacing = GridSpacing::vertical(GridSpacingConfig::new(3, 10, 10)?);
//!     let margins = spacing.margins(&LayoutContext::new(9, 300, 4))?;
//!
//!     let client = HttpClient::new(ClientConfig::default())?;
//!     let dirs = CacheDirs::from_system("com.example.app", true);
//!     let loader = ImageLoader::new(ImageLoaderConfig::default(), client, &dirs).await?;
//!     loader.display_image("cover.png", Arc::new(ImageSlot::new())).await?;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, Result};

// Essential components
pub use crate::app::{
    CacheDirs, ClientConfig, CompressOption, DisplayOptions, GridSpacing, GridSpacingConfig,
    HttpClient, HttpRequest, HttpResponse, ImageLoader, ImageLoaderConfig, ImageSlot, ImageTarget,
    ItemDecoration, ItemMargins, LayoutContext, PixelFormat, compress,
};
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{LOG_REQUEST_KEY, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
