//! Segmentation capability abstraction
//!
//! The pixel-level background-removal model is an external capability with
//! a deliberately narrow contract: image in, image with background pixels
//! made transparent out, dimensions unchanged. It is expressed as a trait
//! so deployments can inject a neural model and tests can inject a stub
//! without loading one.

use crate::error::Result;
use image::{DynamicImage, Rgba, RgbaImage};

/// Trait for background segmentation capabilities
pub trait BackgroundSegmenter: Send + Sync {
    /// Produce a copy of `image` with background pixels made transparent.
    ///
    /// Implementations must preserve pixel dimensions exactly; only the
    /// alpha channel of background pixels may change. Callers verify this
    /// and reject implementations that violate it.
    ///
    /// # Errors
    /// - Model inference failures
    /// - Input the capability cannot process
    fn remove_background(&self, image: &DynamicImage) -> Result<DynamicImage>;

    /// Human-readable name of the capability, for logging
    fn name(&self) -> &str {
        "segmenter"
    }
}

/// Chroma-key segmenter: treats the color sampled at the top-left corner as
/// the background and clears the alpha of every pixel within a per-channel
/// tolerance of it.
///
/// This is not a substitute for a trained model on photographic input, but
/// it makes the pipeline operable without one and gives tests a
/// deterministic capability with real alpha-channel behavior.
#[derive(Debug, Clone)]
pub struct ChromaKeySegmenter {
    tolerance: u8,
}

impl ChromaKeySegmenter {
    /// Create a segmenter with the given per-channel tolerance
    #[must_use]
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    fn matches_key(&self, pixel: Rgba<u8>, key: Rgba<u8>) -> bool {
        pixel
            .0
            .iter()
            .take(3)
            .zip(key.0.iter().take(3))
            .all(|(&channel, &reference)| channel.abs_diff(reference) <= self.tolerance)
    }
}

impl Default for ChromaKeySegmenter {
    fn default() -> Self {
        Self::new(16)
    }
}

impl BackgroundSegmenter for ChromaKeySegmenter {
    fn remove_background(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Ok(DynamicImage::ImageRgba8(rgba));
        }

        let key = *rgba.get_pixel(0, 0);
        let mut output = RgbaImage::new(width, height);
        for (x, y, pixel) in rgba.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *pixel;
            let alpha = if self.matches_key(*pixel, key) { 0 } else { a };
            output.put_pixel(x, y, Rgba([r, g, b, alpha]));
        }
        Ok(DynamicImage::ImageRgba8(output))
    }

    fn name(&self) -> &str {
        "chroma-key"
    }
}
