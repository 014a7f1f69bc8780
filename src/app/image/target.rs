//! Display targets and loading listeners

use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

use image::DynamicImage;

/// Where a loaded image ends up
///
/// Implementations are called from the async runtime and must not block.
pub trait ImageTarget: Send + Sync + Debug {
    /// Size to fit the image into, if known
    fn size(&self) -> Option<(u32, u32)> {
        None
    }

    fn show_placeholder(&self, resource: &str);

    /// Show a decoded image; may be called once for a preview, then again
    /// for the full image
    fn show_image(&self, image: Arc<DynamicImage>);

    fn show_error(&self, resource: &str);

    /// Resize request from fit-width loads
    fn set_height(&self, _height: u32) {}
}

/// Callbacks for the lifecycle of one request
pub trait ImageLoadingListener: Send + Sync + Debug {
    fn on_loading_started(&self, _path: &str) {}
    fn on_loading_failed(&self, _path: &str, _reason: &str) {}
    fn on_loading_complete(&self, _path: &str, _image: &DynamicImage) {}
    fn on_loading_cancelled(&self, _path: &str) {}
}

/// What a [`ImageSlot`] currently shows
#[derive(Debug, Clone, Default)]
pub enum SlotContent {
    #[default]
    Empty,
    Placeholder(String),
    Image(Arc<DynamicImage>),
    Error(String),
}

#[derive(Debug, Default)]
struct SlotState {
    content: SlotContent,
    height: Option<u32>,
    history: Vec<&'static str>,
}

/// In-memory target that remembers what it was asked to show
#[derive(Debug, Default)]
pub struct ImageSlot {
    size: Option<(u32, u32)>,
    state: Mutex<SlotState>,
}

impl ImageSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot with a known display size
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            size: Some((width, height)),
            ..Default::default()
        }
    }

    pub fn content(&self) -> SlotContent {
        self.lock().content.clone()
    }

    /// The image currently shown, if any
    pub fn image(&self) -> Option<Arc<DynamicImage>> {
        match &self.lock().content {
            SlotContent::Image(image) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    /// Height last requested by a fit-width load
    pub fn height(&self) -> Option<u32> {
        self.lock().height
    }

    /// Sequence of calls received: `placeholder`, `image`, `error`
    pub fn history(&self) -> Vec<&'static str> {
        self.lock().history.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ImageTarget for ImageSlot {
    fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn show_placeholder(&self, resource: &str) {
        let mut state = self.lock();
        state.content = SlotContent::Placeholder(resource.to_string());
        state.history.push("placeholder");
    }

    fn show_image(&self, image: Arc<DynamicImage>) {
        let mut state = self.lock();
        state.content = SlotContent::Image(image);
        state.history.push("image");
    }

    fn show_error(&self, resource: &str) {
        let mut state = self.lock();
        state.content = SlotContent::Error(resource.to_string());
        state.history.push("error");
    }

    fn set_height(&self, height: u32) {
        self.lock().height = Some(height);
    }
}

/// Listener that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogListener;

impl ImageLoadingListener for LogListener {
    fn on_loading_started(&self, path: &str) {
        tracing::trace!("onLoadingStarted, path:{}", path);
    }

    fn on_loading_complete(&self, path: &str, image: &DynamicImage) {
        tracing::debug!(
            "onLoadingComplete, path:{}, {}x{}",
            path,
            image.width(),
            image.height()
        );
    }

    fn on_loading_cancelled(&self, path: &str) {
        tracing::debug!("onLoadingCancelled, path:{}", path);
    }
}
