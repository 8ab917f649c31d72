//! Image decode, resize, and encode pipeline

use crate::EngineError;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Render-ready bitmap: RGBA8 pixels plus dimensions
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Convert a decoded image into render-ready RGBA8
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: rgba.into_raw(),
        }
    }
}

/// Image codec with an invocation counter.
///
/// The counter covers every decode, whether from a source file or cached
/// bytes, so cache-hit behavior is observable.
#[derive(Debug, Default)]
pub struct Codec {
    decodes: AtomicU64,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of decode invocations so far
    pub fn decode_count(&self) -> u64 {
        self.decodes.load(Ordering::Relaxed)
    }

    /// Decode an image file from disk
    pub fn decode(&self, path: &Path) -> Result<DynamicImage, EngineError> {
        self.decodes.fetch_add(1, Ordering::Relaxed);

        let reader = ImageReader::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::SourceUnavailable(path.display().to_string())
            } else {
                EngineError::Io(e)
            }
        })?;

        let img = reader
            .with_guessed_format()
            .map_err(|e| EngineError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        Ok(img)
    }

    /// Decode an image from in-memory encoded bytes
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<DynamicImage, EngineError> {
        self.decodes.fetch_add(1, Ordering::Relaxed);

        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| EngineError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| EngineError::Decode(e.to_string()))?;

        Ok(img)
    }
}

/// Output dimensions for fitting `(width, height)` within a square of
/// `target` pixels: the longer source side maps to `target`, the other side
/// scales by aspect ratio, and both are floored to at least 1 pixel. Smaller
/// sources scale up.
pub fn fit_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    if width == 0 || height == 0 || target == 0 {
        return (target.max(1), target.max(1));
    }

    let aspect = width as f64 / height as f64;
    if aspect > 1.0 {
        (target, ((target as f64 / aspect) as u32).max(1))
    } else {
        (((target as f64 * aspect) as u32).max(1), target)
    }
}

/// Resize to fit within `target x target`, preserving aspect ratio.
/// Lanczos resampling: results are cached, so fidelity beats speed.
pub fn resize_to_fit(img: &DynamicImage, target: u32) -> DynamicImage {
    let (src_width, src_height) = img.dimensions();
    let (width, height) = fit_dimensions(src_width, src_height, target);
    img.resize_exact(width, height, image::imageops::FilterType::Lanczos3)
}

/// Encode a bitmap as PNG for the disk store
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, EngineError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_fit_dimensions_landscape() {
        // 64x48 into 16: long side 64 -> 16, short side 48 -> 12
        assert_eq!(fit_dimensions(64, 48, 16), (16, 12));
    }

    #[test]
    fn test_fit_dimensions_portrait() {
        assert_eq!(fit_dimensions(48, 64, 16), (12, 16));
    }

    #[test]
    fn test_fit_dimensions_square_and_upscale() {
        assert_eq!(fit_dimensions(10, 10, 100), (100, 100));
        // Smaller sources scale up too
        assert_eq!(fit_dimensions(4, 2, 64), (64, 32));
    }

    #[test]
    fn test_fit_dimensions_floors_to_one_pixel() {
        // Extreme aspect ratio must not collapse to zero
        assert_eq!(fit_dimensions(10_000, 10, 16), (16, 1));
    }

    #[test]
    fn test_decode_counts_invocations() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("img.png");
        RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let codec = Codec::new();
        assert_eq!(codec.decode_count(), 0);
        codec.decode(&path).unwrap();
        assert_eq!(codec.decode_count(), 1);
        codec.decode(&path).unwrap();
        assert_eq!(codec.decode_count(), 2);
    }

    #[test]
    fn test_decode_missing_is_source_unavailable() {
        let codec = Codec::new();
        let err = codec.decode(Path::new("/nonexistent/img.png")).unwrap_err();
        assert!(matches!(err, EngineError::SourceUnavailable(_)));
    }

    #[test]
    fn test_decode_corrupt_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let codec = Codec::new();
        let err = codec.decode(&path).unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn test_encode_decode_roundtrip_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(20, 30, Rgba([9, 8, 7, 255])));
        let bytes = encode_png(&img).unwrap();

        let codec = Codec::new();
        let decoded = codec.decode_bytes(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (20, 30));
    }

    #[test]
    fn test_resize_to_fit_output_dimensions() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, Rgba([0, 0, 0, 255])));
        let thumb = resize_to_fit(&img, 16);
        assert_eq!(thumb.dimensions(), (16, 12));
    }
}
