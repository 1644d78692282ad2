//! Error types for the staging pipeline

use std::path::Path;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, RecorteError>;

/// Coarse failure classification for boundary layers.
///
/// A serving layer maps each kind to a transport status without inspecting
/// message text: `InvalidInput` and `NotFound` are client errors, `Io` is a
/// generic server-side failure, `Provisioning` is fatal at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing/empty parameter, disallowed extension, unparseable color or
    /// resize mode, oversized upload
    InvalidInput,
    /// Referenced logical file does not exist in the relevant root
    NotFound,
    /// Filesystem or decode failure, or a broken segmenter contract
    Io,
    /// Storage directories could not be created at startup
    Provisioning,
}

/// Error types for staging and transformation operations
#[derive(Error, Debug)]
pub enum RecorteError {
    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image format or processing errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Missing or malformed request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Logical file absent from its managed root
    #[error("File not found: {0}")]
    NotFound(String),

    /// Storage root directories could not be provisioned
    #[error("Provisioning error: {0}")]
    Provisioning(String),

    /// Segmentation capability violated its contract
    #[error("Segmentation error: {0}")]
    Segmentation(String),
}

impl RecorteError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new not-found error naming the missing logical file
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new provisioning error
    pub fn provisioning<S: Into<String>>(msg: S) -> Self {
        Self::Provisioning(msg.into())
    }

    /// Create a new segmentation error
    pub fn segmentation<S: Into<String>>(msg: S) -> Self {
        Self::Segmentation(msg.into())
    }

    /// Create a file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {operation} '{path_display}': {error}"),
        ))
    }

    /// Classify this error for the boundary layer
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidInput(_) => FailureKind::InvalidInput,
            Self::NotFound(_) => FailureKind::NotFound,
            Self::Io(_) | Self::Image(_) | Self::Segmentation(_) => FailureKind::Io,
            Self::Provisioning(_) => FailureKind::Provisioning,
        }
    }
}
