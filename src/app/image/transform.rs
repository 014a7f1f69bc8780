//! Bitmap transformations applied after decode

use std::fmt::Debug;

use image::imageops::FilterType;
use image::DynamicImage;

/// A bitmap transformation
///
/// `key` identifies the transformation in cache keys, so two
/// transformations with the same key must produce the same output.
pub trait Transformation: Send + Sync + Debug {
    fn key(&self) -> String;
    fn transform(&self, image: DynamicImage) -> DynamicImage;
}

/// Scale to fit inside the box, keeping the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitCenter {
    pub width: u32,
    pub height: u32,
}

impl FitCenter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Transformation for FitCenter {
    fn key(&self) -> String {
        format!("fit_center({}x{})", self.width, self.height)
    }

    fn transform(&self, image: DynamicImage) -> DynamicImage {
        if self.width == 0 || self.height == 0 {
            return image;
        }
        if (image.width(), image.height()) == (self.width, self.height) {
            return image;
        }
        image.resize(self.width, self.height, FilterType::Triangle)
    }
}

/// Scale to cover the box and crop the overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterCrop {
    pub width: u32,
    pub height: u32,
}

impl CenterCrop {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Transformation for CenterCrop {
    fn key(&self) -> String {
        format!("center_crop({}x{})", self.width, self.height)
    }

    fn transform(&self, image: DynamicImage) -> DynamicImage {
        if self.width == 0 || self.height == 0 {
            return image;
        }
        image.resize_to_fill(self.width, self.height, FilterType::Triangle)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grayscale;

impl Transformation for Grayscale {
    fn key(&self) -> String {
        "grayscale".to_string()
    }

    fn transform(&self, image: DynamicImage) -> DynamicImage {
        image.grayscale()
    }
}

/// Height that shows an image at `target_width` without distortion
///
/// Returns `None` for an image with zero height. A positive `min_height`
/// is a floor.
pub fn fit_width_height(
    target_width: u32,
    image_width: u32,
    image_height: u32,
    min_height: u32,
) -> Option<u32> {
    if image_height == 0 || image_width == 0 {
        return None;
    }
    let ratio = image_width as f32 / image_height as f32;
    let height = (target_width as f32 / ratio) as u32;
    Some(if min_height > 0 { height.max(min_height) } else { height })
}

/// Downscaled copy of `image` by `multiplier`, at least one pixel per side
pub fn thumbnail(image: &DynamicImage, multiplier: f32) -> DynamicImage {
    let scale = |v: u32| ((v as f32 * multiplier) as u32).max(1);
    image.thumbnail(scale(image.width()), scale(image.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn blank(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
    }

    #[test]
    fn test_fit_center_keeps_ratio() {
        let out = FitCenter::new(100, 100).transform(blank(400, 200));
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn test_fit_center_zero_box_is_noop() {
        let out = FitCenter::new(0, 100).transform(blank(40, 20));
        assert_eq!((out.width(), out.height()), (40, 20));
    }

    #[test]
    fn test_center_crop_fills_box() {
        let out = CenterCrop::new(50, 50).transform(blank(400, 200));
        assert_eq!((out.width(), out.height()), (50, 50));
    }

    #[test]
    fn test_fit_width_height() {
        assert_eq!(fit_width_height(300, 400, 200, 0), Some(150));
        assert_eq!(fit_width_height(300, 400, 200, 200), Some(200));
        assert_eq!(fit_width_height(300, 100, 200, 200), Some(600));
        assert_eq!(fit_width_height(300, 100, 0, 0), None);
    }

    #[test]
    fn test_thumbnail_scales_down() {
        let out = thumbnail(&blank(100, 50), 0.2);
        assert_eq!((out.width(), out.height()), (20, 10));
        let tiny = thumbnail(&blank(2, 2), 0.2);
        assert_eq!((tiny.width(), tiny.height()), (1, 1));
    }
}
