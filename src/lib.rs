#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]

//! # recorte
//!
//! Image staging and transformation pipeline for a background-removal
//! service: resolve a logical file name to managed filesystem locations,
//! load the image, transform it (remove background, composite a solid
//! background, resize), and persist the result while archiving the
//! original.
//!
//! The HTTP layer is an external collaborator: it calls
//! [`StagingPipeline`] and maps each failure's [`FailureKind`] to a
//! transport status. The segmentation model is likewise external, injected
//! as a [`BackgroundSegmenter`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use recorte::{ChromaKeySegmenter, StagingPipeline, StorageConfig};
//! use std::sync::Arc;
//!
//! # fn example() -> recorte::Result<()> {
//! let config = StorageConfig::new("/srv/recorte")?;
//! let pipeline = StagingPipeline::new(config, Arc::new(ChromaKeySegmenter::default()))?;
//!
//! let stored = pipeline.upload("teste.jpg", &std::fs::read("teste.jpg")?)?;
//! let output = pipeline.remove_background(&stored)?;
//! let png_bytes = pipeline.fetch_output(&output)?;
//! # let _ = png_bytes;
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage layout
//!
//! All managed images live under three fixed directories below the storage
//! root — `imagens/entrada` (uploads), `imagens/saida` (outputs, always
//! PNG), `imagens/originais` (archived originals). The layout is a
//! compatibility surface and is preserved exactly.

pub mod color;
pub mod config;
pub mod error;
pub mod handle;
pub mod paths;
pub mod pipeline;
pub mod provision;
pub mod segmentation;

#[cfg(feature = "cli")]
pub mod cli;

// Public API exports
pub use color::BackgroundColor;
pub use config::{StorageConfig, StorageConfigBuilder, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::{FailureKind, RecorteError, Result};
pub use handle::{ImageHandle, ResizeMode};
pub use paths::ResolvedPaths;
pub use pipeline::{HealthReport, StagingPipeline};
pub use provision::ensure_directories;
pub use segmentation::{BackgroundSegmenter, ChromaKeySegmenter};

/// Remove the background of an in-memory image, bypassing managed storage.
///
/// Suitable for callers that already hold a decoded image and do not need
/// the staging directories.
///
/// # Errors
/// - The segmenter fails or violates its dimension contract
pub fn remove_background_from_image(
    image: &image::DynamicImage,
    segmenter: &dyn BackgroundSegmenter,
) -> Result<image::DynamicImage> {
    use image::GenericImageView;

    let before = image.dimensions();
    let output = segmenter.remove_background(image)?;
    if output.dimensions() != before {
        return Err(RecorteError::segmentation(format!(
            "segmenter '{}' changed dimensions",
            segmenter.name()
        )));
    }
    Ok(output)
}

/// Remove the background of encoded image bytes and re-encode as PNG.
///
/// # Errors
/// - The bytes cannot be decoded
/// - The segmenter fails or violates its dimension contract
pub fn remove_background_from_bytes(
    image_bytes: &[u8],
    segmenter: &dyn BackgroundSegmenter,
) -> Result<Vec<u8>> {
    let image = image::load_from_memory(image_bytes)?;
    let output = remove_background_from_image(&image, segmenter)?;

    let mut encoded = std::io::Cursor::new(Vec::new());
    output.write_to(&mut encoded, image::ImageFormat::Png)?;
    Ok(encoded.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

    #[test]
    fn bytes_round_trip_produces_png() {
        let img = RgbaImage::from_pixel(6, 4, Rgba([255, 255, 255, 255]));
        let mut jpeg = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut jpeg, image::ImageFormat::Jpeg)
            .unwrap();

        let segmenter = ChromaKeySegmenter::default();
        let png = remove_background_from_bytes(jpeg.get_ref(), &segmenter).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (6, 4));
        assert_eq!(
            image::guess_format(&png).unwrap(),
            image::ImageFormat::Png
        );
    }

    #[test]
    fn undecodable_bytes_fail() {
        let segmenter = ChromaKeySegmenter::default();
        let err = remove_background_from_bytes(b"not an image", &segmenter).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Io);
    }
}
