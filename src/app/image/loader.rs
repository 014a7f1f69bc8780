//! Image loader service
//!
//! Resolves a path (local file or `http(s)` URL) to a decoded image through
//! the memory cache, the disk cache and finally the file system or the
//! network, and delivers placeholder, image and error states to a target.

use std::error::Error as _;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use lru::LruCache;
use tokio::sync::{watch, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use url::Url;

use crate::app::client::HttpClient;
use crate::app::dirs::CacheDirs;
use crate::constants::image as image_constants;
use crate::errors::{ImageError, ImageResult};

use super::config::ImageLoaderConfig;
use super::disk_cache::DiskCache;
use super::request::{DiskCacheStrategy, DisplayOptions, Priority};
use super::target::{ImageLoadingListener, ImageTarget};
use super::transform::{self, FitCenter, Transformation};

/// Loads images into targets
///
/// Cheap to clone; clones share caches and lifecycle state.
#[derive(Clone)]
pub struct ImageLoader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    config: ImageLoaderConfig,
    http: HttpClient,
    disk: DiskCache,
    memory: Mutex<LruCache<String, Arc<DynamicImage>>>,
    permits: Semaphore,
    paused: watch::Sender<bool>,
    shutdown: CancellationToken,
}

impl fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.inner.config)
            .field("disk_cache", &self.inner.disk.dir())
            .field("paused", &self.is_paused())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl ImageLoader {
    /// Create a loader whose disk cache lives under the internal cache root
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` if the disk cache directory cannot be created
    pub async fn new(
        config: ImageLoaderConfig,
        http: HttpClient,
        dirs: &CacheDirs,
    ) -> ImageResult<Self> {
        let disk_dir = dirs.internal_cache_root().join(&config.disk_cache_name);
        Self::with_disk_dir(config, http, disk_dir).await
    }

    /// Create a loader with an explicit disk cache directory
    pub async fn with_disk_dir(
        config: ImageLoaderConfig,
        http: HttpClient,
        disk_dir: PathBuf,
    ) -> ImageResult<Self> {
        let disk = DiskCache::open(disk_dir, config.disk_cache_size_bytes).await?;
        let capacity = NonZeroUsize::new(config.memory_cache_entries).unwrap_or(NonZeroUsize::MIN);
        let (paused, _) = watch::channel(false);

        debug!(
            "ImageLoader created, disk cache {} ({} bytes), memory cache {} entries",
            disk.dir().display(),
            config.disk_cache_size_bytes,
            capacity
        );

        Ok(Self {
            inner: Arc::new(LoaderInner {
                permits: Semaphore::new(config.max_concurrent_fetches.max(1)),
                config,
                http,
                disk,
                memory: Mutex::new(LruCache::new(capacity)),
                paused,
                shutdown: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &ImageLoaderConfig {
        &self.inner.config
    }

    pub fn disk_cache(&self) -> &DiskCache {
        &self.inner.disk
    }

    /// Number of images held in memory
    pub async fn memory_cache_len(&self) -> usize {
        self.inner.memory.lock().await.len()
    }

    pub async fn clear_memory(&self) {
        self.inner.memory.lock().await.clear();
    }

    /// Load with the default options
    pub async fn display_image(
        &self,
        path: &str,
        target: Arc<dyn ImageTarget>,
    ) -> ImageResult<Arc<DynamicImage>> {
        self.display_image_with(path, target, DisplayOptions::default(), None)
            .await
    }

    /// Load for gallery browsing: a 0.2 preview first, then the full image
    pub async fn display_image_for_gallery(
        &self,
        path: &str,
        target: Arc<dyn ImageTarget>,
        listener: Option<Arc<dyn ImageLoadingListener>>,
    ) -> ImageResult<Arc<DynamicImage>> {
        self.display_image_with(path, target, DisplayOptions::gallery(), listener)
            .await
    }

    /// Load, then ask the target to take the height that shows the image at
    /// its full width, but no less than `min_height` when that is positive
    pub async fn display_image_fit_width(
        &self,
        path: &str,
        target: Arc<dyn ImageTarget>,
        min_height: u32,
    ) -> ImageResult<Arc<DynamicImage>> {
        let image = self
            .display_image_with(path, Arc::clone(&target), DisplayOptions::default(), None)
            .await?;

        let target_width = target.size().map_or(0, |(width, _)| width);
        if let Some(height) =
            transform::fit_width_height(target_width, image.width(), image.height(), min_height)
        {
            target.set_height(height);
        }
        Ok(image)
    }

    /// Load `path` into `target`
    ///
    /// The target shows the placeholder, then the image (after a preview
    /// when `options.thumbnail < 1.0`), or the error resource on failure.
    ///
    /// # Errors
    ///
    /// Returns the failure that was reported to the listener;
    /// `ImageError::Destroyed` if the loader was destroyed before the call.
    pub async fn display_image_with(
        &self,
        path: &str,
        target: Arc<dyn ImageTarget>,
        options: DisplayOptions,
        listener: Option<Arc<dyn ImageLoadingListener>>,
    ) -> ImageResult<Arc<DynamicImage>> {
        if self.is_destroyed() {
            return Err(ImageError::Destroyed);
        }

        if let Some(placeholder) = &options.placeholder {
            target.show_placeholder(placeholder);
        }
        if let Some(listener) = &listener {
            listener.on_loading_started(path);
        }

        let result = tokio::select! {
            biased;
            _ = self.inner.shutdown.cancelled() => Err(ImageError::Cancelled {
                path: path.to_string(),
            }),
            result = self.load(path, target.as_ref(), &options) => result,
        };

        match result {
            Ok(image) => {
                target.show_image(Arc::clone(&image));
                if let Some(listener) = &listener {
                    listener.on_loading_complete(path, &image);
                }
                Ok(image)
            }
            Err(e @ ImageError::Cancelled { .. }) => {
                debug!("displayImage cancelled, path:{}", path);
                if let Some(listener) = &listener {
                    listener.on_loading_cancelled(path);
                }
                Err(e)
            }
            Err(e) => {
                let reason = describe(&e);
                error!("displayImage, Exception e:{}, path:{}", reason, path);
                if let Some(resource) = &options.error {
                    target.show_error(resource);
                }
                if let Some(listener) = &listener {
                    listener.on_loading_failed(path, &reason);
                }
                Err(e)
            }
        }
    }

    /// Hold new and pending requests before they fetch anything
    pub fn pause(&self) {
        debug!("ImageLoader pause...");
        self.inner.paused.send_replace(true);
    }

    pub fn resume(&self) {
        debug!("ImageLoader resume...");
        self.inner.paused.send_replace(false);
    }

    /// Cancel in-flight requests and refuse new ones
    pub fn destroy(&self) {
        debug!("ImageLoader destroy...");
        self.inner.shutdown.cancel();
        self.inner.permits.close();
    }

    pub fn is_paused(&self) -> bool {
        *self.inner.paused.borrow()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    async fn wait_until_resumed(&self) -> ImageResult<()> {
        let mut paused = self.inner.paused.subscribe();
        paused
            .wait_for(|paused| !*paused)
            .await
            .map(|_| ())
            .map_err(|_| ImageError::Destroyed)
    }

    async fn load(
        &self,
        path: &str,
        target: &dyn ImageTarget,
        options: &DisplayOptions,
    ) -> ImageResult<Arc<DynamicImage>> {
        let size = target.size();
        let key = resource_key(path, size, options);

        if !options.skip_memory_cache {
            if let Some(hit) = self.inner.memory.lock().await.get(&key).cloned() {
                debug!("Memory cache hit: {}", path);
                return Ok(hit);
            }
        }

        if options.priority != Priority::Immediate {
            self.wait_until_resumed().await?;
        }
        let _permit = self
            .inner
            .permits
            .acquire()
            .await
            .map_err(|_| ImageError::Destroyed)?;

        let timeout = options.timeout.unwrap_or(self.inner.config.load_timeout);
        let image = tokio::time::timeout(timeout, self.fetch_and_decode(path, &key, size, options, target))
            .await
            .map_err(|_| ImageError::Timeout {
                path: path.to_string(),
                millis: timeout.as_millis() as u64,
            })??;

        let image = Arc::new(image);
        if !options.skip_memory_cache {
            self.inner.memory.lock().await.put(key, Arc::clone(&image));
        }
        Ok(image)
    }

    async fn fetch_and_decode(
        &self,
        path: &str,
        key: &str,
        size: Option<(u32, u32)>,
        options: &DisplayOptions,
        target: &dyn ImageTarget,
    ) -> ImageResult<DynamicImage> {
        let remote = is_remote(path);
        let strategy = options.disk_cache_strategy;

        if strategy.caches_resource(remote) {
            if let Some(bytes) = self.inner.disk.get(key).await {
                debug!("Disk cache hit (resource): {}", path);
                match decode(path, bytes).await {
                    Ok(image) => return Ok(image),
                    Err(ImageError::Decode { .. }) => {
                        warn!("Discarding unreadable cached resource of {}", path);
                        self.inner.disk.remove(key).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let transformations: Vec<Arc<dyn Transformation>> = options.transformations.clone();
        let preview = options.wants_preview().then_some(options.thumbnail);

        let (bytes, cached) = self.source_bytes(path, strategy, remote).await?;
        let processed = process(path, bytes, size, transformations.clone(), preview).await;
        let (image, preview) = match processed {
            Err(ImageError::Decode { .. }) if cached => {
                warn!("Discarding unreadable cached source of {}", path);
                self.inner.disk.remove(&source_key(path)).await;
                let (bytes, _) = self.source_bytes(path, strategy, remote).await?;
                process(path, bytes, size, transformations, preview).await?
            }
            other => other?,
        };

        if let Some(preview) = preview {
            target.show_image(Arc::new(preview));
        }

        if strategy.caches_resource(remote) {
            self.store_resource(key, &image).await;
        }
        Ok(image)
    }

    /// Source bytes, and whether they came from the disk cache
    async fn source_bytes(
        &self,
        path: &str,
        strategy: DiskCacheStrategy,
        remote: bool,
    ) -> ImageResult<(Vec<u8>, bool)> {
        let source_key = source_key(path);
        let cache_source = strategy.caches_source(remote);

        if cache_source {
            if let Some(bytes) = self.inner.disk.get(&source_key).await {
                debug!("Disk cache hit (source): {}", path);
                return Ok((bytes, true));
            }
        }

        let bytes = if remote {
            self.fetch_remote(path).await?
        } else {
            read_local(path).await?
        };

        if cache_source {
            if let Err(e) = self.inner.disk.put(&source_key, &bytes).await {
                warn!("Failed to cache source of {}: {}", path, describe(&e));
            }
        }
        Ok((bytes, false))
    }

    async fn fetch_remote(&self, url: &str) -> ImageResult<Vec<u8>> {
        let response = self
            .inner
            .http
            .get_bytes(url, image_constants::ACCEPT)
            .await?;
        if !response.is_success() {
            return Err(ImageError::HttpStatus {
                status: response.status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.body)
    }

    async fn store_resource(&self, key: &str, image: &DynamicImage) {
        let image = image.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            let mut bytes = Vec::new();
            image
                .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
                .map(|_| bytes)
        })
        .await;

        match encoded {
            Ok(Ok(bytes)) => {
                if let Err(e) = self.inner.disk.put(key, &bytes).await {
                    warn!("Failed to cache resource {}: {}", key, describe(&e));
                }
            }
            Ok(Err(e)) => warn!("Failed to encode resource {}: {}", key, e),
            Err(e) => warn!("Resource encode task failed: {}", e),
        }
    }
}

fn is_remote(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn local_path(path: &str) -> PathBuf {
    if path.starts_with("file:") {
        if let Some(file) = Url::parse(path).ok().and_then(|u| u.to_file_path().ok()) {
            return file;
        }
    }
    PathBuf::from(path)
}

async fn read_local(path: &str) -> ImageResult<Vec<u8>> {
    let file = local_path(path);
    tokio::fs::read(&file)
        .await
        .map_err(|source| ImageError::Io { path: file, source })
}

async fn decode(path: &str, bytes: Vec<u8>) -> ImageResult<DynamicImage> {
    let label = path.to_string();
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map_err(|source| ImageError::Decode { path: label, source })
    })
    .await?
}

/// Decode, fit to the display size and apply transformations off the runtime
async fn process(
    path: &str,
    bytes: Vec<u8>,
    size: Option<(u32, u32)>,
    transformations: Vec<Arc<dyn Transformation>>,
    preview: Option<f32>,
) -> ImageResult<(DynamicImage, Option<DynamicImage>)> {
    let label = path.to_string();
    tokio::task::spawn_blocking(move || {
        let decoded = image::load_from_memory(&bytes)
            .map_err(|source| ImageError::Decode { path: label, source })?;
        let mut image = match size {
            Some((width, height)) => FitCenter::new(width, height).transform(decoded),
            None => decoded,
        };
        for transformation in &transformations {
            image = transformation.transform(image);
        }
        let preview = preview.map(|multiplier| transform::thumbnail(&image, multiplier));
        Ok((image, preview))
    })
    .await?
}

fn source_key(path: &str) -> String {
    format!("source:{}", path)
}

/// Cache key of the processed image: source, display size and transformations
fn resource_key(path: &str, size: Option<(u32, u32)>, options: &DisplayOptions) -> String {
    let size = size.map_or_else(|| "original".to_string(), |(w, h)| format!("{}x{}", w, h));
    format!("{}|{}|{}", path, size, options.transformation_keys().join(","))
}

/// Error message including its sources
fn describe(error: &ImageError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
