//! Per-request display options

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::image;

use super::transform::Transformation;

/// Which data the disk cache keeps for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskCacheStrategy {
    /// Source bytes and the processed image
    #[default]
    All,
    /// Nothing
    None,
    /// Source bytes only
    Data,
    /// Processed image only
    Resource,
    /// Source bytes for remote images, the processed image for local ones
    Automatic,
}

impl DiskCacheStrategy {
    pub fn caches_source(self, remote: bool) -> bool {
        match self {
            Self::All | Self::Data => true,
            Self::Automatic => remote,
            Self::None | Self::Resource => false,
        }
    }

    pub fn caches_resource(self, remote: bool) -> bool {
        match self {
            Self::All | Self::Resource => true,
            Self::Automatic => !remote,
            Self::None | Self::Data => false,
        }
    }
}

/// Request priority
///
/// `Immediate` requests skip the pause gate; everything else waits in
/// arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Immediate,
    High,
    #[default]
    Normal,
    Low,
}

/// How a single image request is displayed and cached
#[derive(Clone)]
pub struct DisplayOptions {
    /// Size multiplier of a preview shown before the full image; `1.0` disables it
    pub thumbnail: f32,
    /// Resource shown while loading
    pub placeholder: Option<String>,
    /// Resource shown when loading fails
    pub error: Option<String>,
    pub skip_memory_cache: bool,
    pub disk_cache_strategy: DiskCacheStrategy,
    pub priority: Priority,
    /// Overrides the loader's default timeout
    pub timeout: Option<Duration>,
    pub transformations: Vec<Arc<dyn Transformation>>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            thumbnail: 1.0,
            placeholder: Some(image::PLACEHOLDER_TRANSPARENT.to_string()),
            error: Some(image::PHOTO_LOADING_ERROR.to_string()),
            skip_memory_cache: false,
            disk_cache_strategy: DiskCacheStrategy::All,
            priority: Priority::Normal,
            timeout: None,
            transformations: Vec::new(),
        }
    }
}

impl fmt::Debug for DisplayOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayOptions")
            .field("thumbnail", &self.thumbnail)
            .field("placeholder", &self.placeholder)
            .field("error", &self.error)
            .field("skip_memory_cache", &self.skip_memory_cache)
            .field("disk_cache_strategy", &self.disk_cache_strategy)
            .field("priority", &self.priority)
            .field("timeout", &self.timeout)
            .field("transformations", &self.transformation_keys())
            .finish()
    }
}

impl DisplayOptions {
    /// Options used for gallery browsing: a 0.2 preview and the error resource
    pub fn gallery() -> Self {
        Self {
            thumbnail: image::GALLERY_THUMBNAIL,
            placeholder: None,
            ..Default::default()
        }
    }

    pub fn thumbnail(mut self, multiplier: f32) -> Self {
        self.thumbnail = multiplier;
        self
    }

    pub fn placeholder(mut self, resource: impl Into<String>) -> Self {
        self.placeholder = Some(resource.into());
        self
    }

    pub fn error(mut self, resource: impl Into<String>) -> Self {
        self.error = Some(resource.into());
        self
    }

    pub fn skip_memory_cache(mut self, skip: bool) -> Self {
        self.skip_memory_cache = skip;
        self
    }

    pub fn disk_cache_strategy(mut self, strategy: DiskCacheStrategy) -> Self {
        self.disk_cache_strategy = strategy;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transform(mut self, transformation: impl Transformation + 'static) -> Self {
        self.transformations.push(Arc::new(transformation));
        self
    }

    /// Whether a reduced preview is shown first
    pub fn wants_preview(&self) -> bool {
        self.thumbnail > 0.0 && self.thumbnail < 1.0
    }

    pub(crate) fn transformation_keys(&self) -> Vec<String> {
        self.transformations.iter().map(|t| t.key()).collect()
    }
}
