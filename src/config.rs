//! Configuration types for the staging pipeline

use crate::error::{RecorteError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default maximum accepted upload size (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

// Subdirectory names under the storage root. These are a compatibility
// surface shared with earlier deployments and must not change: existing
// storage roots are laid out this way.
const INPUT_SUBDIR: [&str; 2] = ["imagens", "entrada"];
const OUTPUT_SUBDIR: [&str; 2] = ["imagens", "saida"];
const ORIGINALS_SUBDIR: [&str; 2] = ["imagens", "originais"];

/// Storage configuration for the staging pipeline.
///
/// Holds the storage root and the upload limits. Created once at process
/// start and immutable thereafter; every path the pipeline touches is
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which the managed image directories live
    pub root: PathBuf,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,

    /// Allowed upload extensions, lowercase, without the leading dot
    pub allowed_extensions: Vec<String>,
}

impl StorageConfig {
    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::new()
    }

    /// Create a configuration with defaults under the given root
    ///
    /// # Errors
    /// - The root is the empty path
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self> {
        Self::builder().root(root).build()
    }

    /// Directory uploaded images are written to
    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        join_subdir(&self.root, &INPUT_SUBDIR)
    }

    /// Directory transformed images are written to
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        join_subdir(&self.root, &OUTPUT_SUBDIR)
    }

    /// Directory original uploads are archived to
    #[must_use]
    pub fn originals_dir(&self) -> PathBuf {
        join_subdir(&self.root, &ORIGINALS_SUBDIR)
    }

    /// Check whether a file extension is accepted for upload
    /// (case-insensitive, no leading dot)
    #[must_use]
    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        let lowered = extension.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| *e == lowered)
    }
}

fn join_subdir(root: &Path, parts: &[&str]) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in parts {
        path.push(part);
    }
    path
}

/// Builder for [`StorageConfig`]
#[derive(Debug, Clone, Default)]
pub struct StorageConfigBuilder {
    root: Option<PathBuf>,
    max_upload_bytes: Option<u64>,
    allowed_extensions: Option<Vec<String>>,
}

impl StorageConfigBuilder {
    /// Create a new builder with no values set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage root directory
    #[must_use]
    pub fn root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the maximum accepted upload size in bytes
    #[must_use]
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Set the allowed upload extensions (lowercased on build)
    #[must_use]
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - No storage root was set, or it is the empty path
    /// - The upload limit is zero
    /// - The extension set is empty
    pub fn build(self) -> Result<StorageConfig> {
        let root = self
            .root
            .ok_or_else(|| RecorteError::invalid_input("storage root is required"))?;
        if root.as_os_str().is_empty() {
            return Err(RecorteError::invalid_input("storage root must be non-empty"));
        }

        let max_upload_bytes = self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);
        if max_upload_bytes == 0 {
            return Err(RecorteError::invalid_input(
                "maximum upload size must be non-zero",
            ));
        }

        let allowed_extensions: Vec<String> = self
            .allowed_extensions
            .unwrap_or_else(|| vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()])
            .into_iter()
            .map(|e| e.to_ascii_lowercase())
            .collect();
        if allowed_extensions.is_empty() {
            return Err(RecorteError::invalid_input(
                "at least one allowed extension is required",
            ));
        }

        Ok(StorageConfig {
            root,
            max_upload_bytes,
            allowed_extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_directories_follow_storage_layout() {
        let config = StorageConfig::new("/srv/recorte").unwrap();
        assert_eq!(
            config.input_dir(),
            PathBuf::from("/srv/recorte/imagens/entrada")
        );
        assert_eq!(
            config.output_dir(),
            PathBuf::from("/srv/recorte/imagens/saida")
        );
        assert_eq!(
            config.originals_dir(),
            PathBuf::from("/srv/recorte/imagens/originais")
        );
    }

    #[test]
    fn defaults_match_service_configuration() {
        let config = StorageConfig::new("/srv/recorte").unwrap();
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.allowed_extensions, vec!["png", "jpg", "jpeg"]);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let config = StorageConfig::new("/srv/recorte").unwrap();
        assert!(config.is_allowed_extension("png"));
        assert!(config.is_allowed_extension("JPG"));
        assert!(config.is_allowed_extension("Jpeg"));
        assert!(!config.is_allowed_extension("txt"));
        assert!(!config.is_allowed_extension("webp"));
    }

    #[test]
    fn builder_rejects_missing_root() {
        let result = StorageConfig::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_rejects_zero_upload_limit() {
        let result = StorageConfig::builder()
            .root("/srv/recorte")
            .max_upload_bytes(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_lowercases_extensions() {
        let config = StorageConfig::builder()
            .root("/srv/recorte")
            .allowed_extensions(["PNG", "Jpg"])
            .build()
            .unwrap();
        assert_eq!(config.allowed_extensions, vec!["png", "jpg"]);
        assert!(config.is_allowed_extension("png"));
    }
}
