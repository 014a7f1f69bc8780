//! Core library components for commonlib
//!
//! This module contains the grid spacing calculator, the HTTP client with
//! its interceptor chain, the image loader, bitmap compression and cache
//! directory resolution.
//!
//! # Examples
//!
//! ```rust,no_run
//! use commonlib::app::{ClientConfig, HttpClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new(ClientConfig::default())?;
//!
//! // Suppress logging for a single request
//! let request = commonlib::app::HttpRequest::get("https://example.com/api")?
//!     .header("logRequest", "false")?;
//! let response = client.execute(request).await?;
//! println!("{}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod bitmap;
pub mod client;
pub mod decoration;
pub mod dirs;
pub mod image;

// Re-export main public API
pub use self::bitmap::{compress, CompressOption, CompressedImage, Encoding, PixelFormat};
pub use self::client::{
    CacheControlRewrite, ClientConfig, HttpClient, HttpLogInterceptor, HttpRequest, HttpResponse,
    Interceptor, Next, TlsPolicy, Transport,
};
pub use self::decoration::{
    GridSpacing, GridSpacingConfig, ItemDecoration, ItemMargins, LayoutContext, Orientation,
};
pub use self::dirs::CacheDirs;
pub use self::image::{
    DiskCacheStrategy, DisplayOptions, ImageLoader, ImageLoaderConfig, ImageLoadingListener,
    ImageSlot, ImageTarget, Priority,
};
