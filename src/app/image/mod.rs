//! Image loading with memory and disk caches
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use commonlib::app::client::{ClientConfig, HttpClient};
//! use commonlib::app::dirs::CacheDirs;
//! use commonlib::app::image::{ImageLoader, ImageLoaderConfig, ImageSlot};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http = HttpClient::new(ClientConfig::default())?;
//! let dirs = CacheDirs::from_system("com.example.app", false);
//! let loader = ImageLoader::new(ImageLoaderConfig::default(), http, &dirs).await?;
//!
//! let slot = Arc::new(ImageSlot::with_size(320, 240));
//! loader.display_image("https://example.com/cover.png", slot.clone()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod disk_cache;
pub mod loader;
pub mod request;
pub mod target;
pub mod transform;

pub use config::ImageLoaderConfig;
pub use disk_cache::DiskCache;
pub use loader::ImageLoader;
pub use request::{DiskCacheStrategy, DisplayOptions, Priority};
pub use target::{ImageLoadingListener, ImageSlot, ImageTarget, LogListener, SlotContent};
pub use transform::{CenterCrop, FitCenter, Grayscale, Transformation};
