//! Bitmap compression options and the compressor that applies them

use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::bitmap;
use crate::errors::{CompressError, CompressResult};

/// Pixel layout the compressed bitmap is reduced to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8 bits per channel with alpha
    #[default]
    Argb8888,
    /// 5/6/5 bits colour, no alpha
    Rgb565,
    /// 4 bits per channel with alpha
    Argb4444,
    /// Single channel
    Alpha8,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Argb8888 => "ARGB_8888",
            PixelFormat::Rgb565 => "RGB_565",
            PixelFormat::Argb4444 => "ARGB_4444",
            PixelFormat::Alpha8 => "ALPHA_8",
        };
        f.write_str(name)
    }
}

/// Limits applied when compressing a bitmap
///
/// Non-positive limits leave that dimension (or the size) unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOption {
    pub max_width: i32,
    pub max_height: i32,
    pub max_size_kb: i64,
    pub config: PixelFormat,
    /// Keep the aspect ratio when shrinking to the width/height limits
    pub lock_ratio: bool,
}

impl Default for CompressOption {
    fn default() -> Self {
        Self {
            max_width: 0,
            max_height: 0,
            max_size_kb: 0,
            config: PixelFormat::Argb8888,
            lock_ratio: true,
        }
    }
}

impl fmt::Display for CompressOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompressOption{{maxHeight={}, maxWidth={}, maxSizeInKB={}, config={}, lockRatio={}}}",
            self.max_height, self.max_width, self.max_size_kb, self.config, self.lock_ratio
        )
    }
}

impl CompressOption {
    fn width_limit(&self) -> Option<u32> {
        u32::try_from(self.max_width).ok().filter(|w| *w > 0)
    }

    fn height_limit(&self) -> Option<u32> {
        u32::try_from(self.max_height).ok().filter(|h| *h > 0)
    }

    fn size_limit_bytes(&self) -> Option<u64> {
        u64::try_from(self.max_size_kb)
            .ok()
            .filter(|kb| *kb > 0)
            .map(|kb| kb.saturating_mul(1024))
    }

    /// Dimensions an image of `width` x `height` is reduced to
    ///
    /// Images are never enlarged.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        let max_w = self.width_limit();
        let max_h = self.height_limit();

        if !self.lock_ratio {
            return (
                max_w.map_or(width, |m| width.min(m)),
                max_h.map_or(height, |m| height.min(m)),
            );
        }

        let ratio_w = max_w.map_or(1.0, |m| m as f64 / width as f64);
        let ratio_h = max_h.map_or(1.0, |m| m as f64 / height as f64);
        let ratio = ratio_w.min(ratio_h).min(1.0);
        if ratio >= 1.0 {
            return (width, height);
        }
        let scaled = |v: u32| ((v as f64 * ratio).round() as u32).max(1);
        (scaled(width), scaled(height))
    }
}

/// Encoding of a compressed bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Png,
    Jpeg { quality: u8 },
}

/// Output of [`compress`]
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub encoding: Encoding,
}

impl CompressedImage {
    pub fn size_kb(&self) -> u64 {
        (self.bytes.len() as u64).div_ceil(1024)
    }

    /// File extension matching the encoding
    pub fn extension(&self) -> &'static str {
        match self.encoding {
            Encoding::Png => "png",
            Encoding::Jpeg { .. } => "jpg",
        }
    }
}

/// Compress `image` according to `option`
///
/// Without a size limit the result is PNG. With one, JPEG quality steps
/// down until the output fits.
///
/// # Errors
///
/// Returns `CompressError::SizeUnreachable` if even the lowest quality is
/// too large, or `CompressError::Encode` if the encoder fails.
pub fn compress(image: &DynamicImage, option: &CompressOption) -> CompressResult<CompressedImage> {
    let (width, height) = option.target_dimensions(image.width(), image.height());
    let resized = if (width, height) == (image.width(), image.height()) {
        image.clone()
    } else {
        image.resize_exact(width, height, FilterType::Triangle)
    };
    let converted = convert_pixels(resized, option.config);

    debug!(
        "compress {}x{} -> {}x{}, {}",
        image.width(),
        image.height(),
        width,
        height,
        option
    );

    let Some(limit) = option.size_limit_bytes() else {
        let mut bytes = Vec::new();
        converted.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        return Ok(CompressedImage {
            bytes,
            width,
            height,
            encoding: Encoding::Png,
        });
    };

    let mut smallest = u64::MAX;
    let mut quality = bitmap::START_QUALITY;
    loop {
        let bytes = encode_jpeg(&converted, quality)?;
        let size = bytes.len() as u64;
        debug!("compress quality:{}, size:{} bytes", quality, size);
        if size <= limit {
            return Ok(CompressedImage {
                bytes,
                width,
                height,
                encoding: Encoding::Jpeg { quality },
            });
        }
        smallest = smallest.min(size);

        if quality <= bitmap::MIN_QUALITY {
            break;
        }
        quality = quality
            .saturating_sub(bitmap::QUALITY_STEP)
            .max(bitmap::MIN_QUALITY);
    }

    Err(CompressError::SizeUnreachable {
        smallest_kb: smallest.div_ceil(1024),
        limit_kb: limit / 1024,
    })
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> CompressResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    if image.color().has_color() {
        let rgb = image.to_rgb8();
        encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
    } else {
        let luma = image.to_luma8();
        encoder.write_image(luma.as_raw(), luma.width(), luma.height(), ExtendedColorType::L8)?;
    }
    Ok(bytes)
}

/// Reduce pixels to the precision of `format`
fn convert_pixels(image: DynamicImage, format: PixelFormat) -> DynamicImage {
    match format {
        PixelFormat::Argb8888 => DynamicImage::ImageRgba8(image.into_rgba8()),
        PixelFormat::Rgb565 => {
            let mut rgb = image.into_rgb8();
            for pixel in rgb.pixels_mut() {
                pixel.0[0] = quantize(pixel.0[0], 5);
                pixel.0[1] = quantize(pixel.0[1], 6);
                pixel.0[2] = quantize(pixel.0[2], 5);
            }
            DynamicImage::ImageRgb8(rgb)
        }
        PixelFormat::Argb4444 => {
            let mut rgba = image.into_rgba8();
            for pixel in rgba.pixels_mut() {
                for channel in pixel.0.iter_mut() {
                    *channel = quantize(*channel, 4);
                }
            }
            DynamicImage::ImageRgba8(rgba)
        }
        PixelFormat::Alpha8 => DynamicImage::ImageLumaA8(image.into_luma_alpha8()),
    }
}

/// Keep the top `bits` of `value`, replicating them into the low bits
fn quantize(value: u8, bits: u32) -> u8 {
    let kept = value >> (8 - bits);
    let mut out = 0u16;
    let mut filled = 0;
    while filled < 8 {
        out = (out << bits) | kept as u16;
        filled += bits;
    }
    (out >> (filled - 8)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_default_option_display() {
        assert_eq!(
            CompressOption::default().to_string(),
            "CompressOption{maxHeight=0, maxWidth=0, maxSizeInKB=0, config=ARGB_8888, lockRatio=true}"
        );
    }

    #[test]
    fn test_unconstrained_keeps_dimensions() {
        let option = CompressOption::default();
        assert_eq!(option.target_dimensions(800, 600), (800, 600));
    }

    #[test]
    fn test_lock_ratio_scales_by_tightest_limit() {
        let option = CompressOption {
            max_width: 400,
            max_height: 400,
            ..Default::default()
        };
        assert_eq!(option.target_dimensions(800, 600), (400, 300));
        assert_eq!(option.target_dimensions(600, 800), (300, 400));
    }

    #[test]
    fn test_lock_ratio_single_limit() {
        let option = CompressOption {
            max_height: 300,
            ..Default::default()
        };
        assert_eq!(option.target_dimensions(800, 600), (400, 300));
    }

    #[test]
    fn test_never_upscales() {
        let option = CompressOption {
            max_width: 2000,
            max_height: 2000,
            ..Default::default()
        };
        assert_eq!(option.target_dimensions(800, 600), (800, 600));
    }

    #[test]
    fn test_unlocked_ratio_clamps_each_axis() {
        let option = CompressOption {
            max_width: 400,
            max_height: 500,
            lock_ratio: false,
            ..Default::default()
        };
        assert_eq!(option.target_dimensions(800, 600), (400, 500));
        assert_eq!(option.target_dimensions(300, 600), (300, 500));
    }

    #[test]
    fn test_negative_limits_are_unconstrained() {
        let option = CompressOption {
            max_width: -1,
            max_height: -5,
            max_size_kb: -3,
            ..Default::default()
        };
        assert_eq!(option.target_dimensions(80, 60), (80, 60));
        let out = compress(&gradient(8, 6), &option).unwrap();
        assert_eq!(out.encoding, Encoding::Png);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0xFF, 5), 0xFF);
        assert_eq!(quantize(0x00, 6), 0x00);
        assert_eq!(quantize(0xF7, 4), 0xFF);
        assert_eq!(quantize(0x88, 4), 0x88);
    }

    #[test]
    fn test_compress_without_size_limit_is_png() {
        let option = CompressOption {
            max_width: 32,
            ..Default::default()
        };
        let out = compress(&gradient(64, 48), &option).unwrap();
        assert_eq!(out.encoding, Encoding::Png);
        assert_eq!((out.width, out.height), (32, 24));
        assert_eq!(out.extension(), "png");

        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }

    #[test]
    fn test_compress_honours_size_limit() {
        let option = CompressOption {
            max_size_kb: 64,
            config: PixelFormat::Rgb565,
            ..Default::default()
        };
        let out = compress(&gradient(200, 200), &option).unwrap();
        assert!(matches!(out.encoding, Encoding::Jpeg { .. }));
        assert!(out.bytes.len() <= 64 * 1024);
        assert!(image::load_from_memory(&out.bytes).is_ok());
    }

    #[test]
    fn test_huge_size_limit_saturates() {
        let option = CompressOption {
            max_size_kb: i64::MAX,
            ..Default::default()
        };
        assert_eq!(option.size_limit_bytes(), Some(u64::MAX));

        let out = compress(&gradient(16, 16), &option).unwrap();
        assert_eq!(
            out.encoding,
            Encoding::Jpeg {
                quality: bitmap::START_QUALITY
            }
        );
    }

    #[test]
    fn test_compress_unreachable_size() {
        let noisy = RgbImage::from_fn(512, 512, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503));
            Rgb([(v >> 3) as u8, (v >> 11) as u8, (v >> 19) as u8])
        });
        let option = CompressOption {
            max_size_kb: 1,
            ..Default::default()
        };
        match compress(&DynamicImage::ImageRgb8(noisy), &option) {
            Err(CompressError::SizeUnreachable {
                smallest_kb,
                limit_kb,
            }) => {
                assert_eq!(limit_kb, 1);
                assert!(smallest_kb > 1);
            }
            other => panic!("Expected SizeUnreachable, got {:?}", other.map(|o| o.encoding)),
        }
    }

    #[test]
    fn test_alpha8_encodes_as_grayscale_jpeg() {
        let option = CompressOption {
            max_size_kb: 100,
            config: PixelFormat::Alpha8,
            ..Default::default()
        };
        let out = compress(&gradient(40, 40), &option).unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert!(!decoded.color().has_color());
    }
}
