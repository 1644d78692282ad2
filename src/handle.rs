//! Per-image lifecycle: load, transform, persist
//!
//! An [`ImageHandle`] owns one image for the duration of a single request.
//! It is constructed from a resolved input path, mutated in place by the
//! transformation operations, and discarded after [`ImageHandle::save`]
//! completes. No pooling or caching across requests.

use crate::{
    color::BackgroundColor,
    config::StorageConfig,
    error::{RecorteError, Result},
    paths::{split_name, ResolvedPaths},
    segmentation::BackgroundSegmenter,
};
use image::{imageops, DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Resize target for [`ImageHandle::resize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Scale both dimensions by one half, truncating toward zero
    Half,
    /// Resample to an explicit target
    Exact {
        /// Target width in pixels, positive
        width: u32,
        /// Target height in pixels, positive
        height: u32,
    },
}

impl ResizeMode {
    /// Create an exact resize target from a dimension pair
    ///
    /// # Errors
    /// - Either dimension is zero
    pub fn exact(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RecorteError::invalid_input(
                "resize dimensions must be positive",
            ));
        }
        Ok(Self::Exact { width, height })
    }
}

impl FromStr for ResizeMode {
    type Err = RecorteError;

    /// Parse `"half"` or an explicit `"WIDTHxHEIGHT"` pair
    fn from_str(mode: &str) -> Result<Self> {
        let trimmed = mode.trim();
        if trimmed.eq_ignore_ascii_case("half") {
            return Ok(Self::Half);
        }
        if let Some((w, h)) = trimmed.split_once(['x', 'X']) {
            if let (Ok(width), Ok(height)) = (w.trim().parse::<u32>(), h.trim().parse::<u32>()) {
                return Self::exact(width, height);
            }
        }
        Err(RecorteError::invalid_input(format!(
            "unrecognized resize mode: '{mode}'"
        )))
    }
}

/// One image currently being processed
#[derive(Debug)]
pub struct ImageHandle {
    input_path: PathBuf,
    base_name: String,
    full_name: String,
    output_path: PathBuf,
    originals_path: PathBuf,
    image: DynamicImage,
}

impl ImageHandle {
    /// Load the image at `input_path` and derive its managed locations.
    ///
    /// # Errors
    /// - [`RecorteError::NotFound`] if `input_path` does not exist
    /// - [`RecorteError::Image`] if the bytes cannot be decoded
    pub fn open<P: AsRef<Path>>(config: &StorageConfig, input_path: P) -> Result<Self> {
        let input_path = input_path.as_ref();
        if !input_path.exists() {
            let name = input_path
                .file_name()
                .map_or_else(|| input_path.display().to_string(), |n| {
                    n.to_string_lossy().into_owned()
                });
            return Err(RecorteError::not_found(name));
        }

        let lossy = input_path.to_string_lossy();
        let (base, full) = split_name(&lossy);
        let paths = ResolvedPaths::resolve(config, full);
        let image = load_image(input_path)?;

        log::debug!(
            "opened '{}' ({}x{})",
            full,
            image.width(),
            image.height()
        );

        Ok(Self {
            input_path: input_path.to_path_buf(),
            base_name: base.to_string(),
            full_name: full.to_string(),
            output_path: paths.output,
            originals_path: paths.originals,
            image,
        })
    }

    /// File name without extension
    #[must_use]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// File name with extension
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Logical name of the persisted output (`{baseName}.png`)
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!("{}.png", self.base_name)
    }

    /// Canonical output location the image is persisted to
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Current pixel dimensions of the held image
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Replace the held image with the segmentation capability's output.
    ///
    /// The capability's contract says dimensions are preserved exactly;
    /// a violating implementation is rejected here rather than persisting
    /// a corrupted result.
    ///
    /// # Errors
    /// - The segmenter fails or returns an image of different dimensions
    pub fn remove_background(&mut self, segmenter: &dyn BackgroundSegmenter) -> Result<()> {
        let before = self.image.dimensions();
        let output = segmenter.remove_background(&self.image)?;
        let after = output.dimensions();
        if after != before {
            return Err(RecorteError::segmentation(format!(
                "segmenter '{}' changed dimensions from {}x{} to {}x{}",
                segmenter.name(),
                before.0,
                before.1,
                after.0,
                after.1
            )));
        }
        self.image = output;
        Ok(())
    }

    /// Remove the background, then composite the cut-out foreground over a
    /// fully opaque canvas of `color` using "over" alpha compositing. The
    /// result has no transparency and unchanged dimensions.
    ///
    /// # Errors
    /// - Segmentation fails or violates its dimension contract
    pub fn add_background(
        &mut self,
        segmenter: &dyn BackgroundSegmenter,
        color: BackgroundColor,
    ) -> Result<()> {
        self.remove_background(segmenter)?;

        let (width, height) = self.image.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, color.opaque());
        imageops::overlay(&mut canvas, &self.image.to_rgba8(), 0, 0);
        self.image = DynamicImage::ImageRgba8(canvas);
        Ok(())
    }

    /// Resample the held image to the requested dimensions.
    ///
    /// # Errors
    /// - Halving an image already below 2 pixels in either dimension would
    ///   produce an empty image
    pub fn resize(&mut self, mode: ResizeMode) -> Result<()> {
        let (width, height) = match mode {
            ResizeMode::Half => {
                let (w, h) = self.image.dimensions();
                (w / 2, h / 2)
            },
            ResizeMode::Exact { width, height } => (width, height),
        };
        if width == 0 || height == 0 {
            return Err(RecorteError::invalid_input(
                "resize would produce an empty image",
            ));
        }
        self.image = self
            .image
            .resize_exact(width, height, imageops::FilterType::Triangle);
        Ok(())
    }

    /// Persist the held image as PNG to the output path, then archive the
    /// unmodified source bytes to the originals path. Archival is
    /// unconditional and idempotent.
    ///
    /// # Errors
    /// - [`RecorteError::Io`] or [`RecorteError::Image`] if either write fails
    pub fn save(&self) -> Result<()> {
        // Output format is forced to PNG: compositing needs an alpha
        // channel and PNG encodes it losslessly.
        self.image
            .save_with_format(&self.output_path, ImageFormat::Png)?;
        log::debug!("saved output to '{}'", self.output_path.display());

        std::fs::copy(&self.input_path, &self.originals_path).map_err(|e| {
            RecorteError::file_io_error("archive original to", &self.originals_path, &e)
        })?;
        log::debug!("archived original to '{}'", self.originals_path.display());
        Ok(())
    }
}

/// Load an image, falling back to content-based format detection when the
/// extension-based decode fails (a `.jpg` that is really a PNG still loads).
fn load_image(path: &Path) -> Result<DynamicImage> {
    match image::open(path) {
        Ok(img) => Ok(img),
        Err(e) => {
            log::debug!(
                "extension-based decode failed for '{}': {e}; trying content detection",
                path.display()
            );
            let data = std::fs::read(path)
                .map_err(|io_err| RecorteError::file_io_error("read image data", path, &io_err))?;
            image::load_from_memory(&data).map_err(RecorteError::from)
        },
    }
}
