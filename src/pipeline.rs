//! Transformation façade
//!
//! [`StagingPipeline`] is the thin per-request orchestration the serving
//! layer calls: it validates the caller-supplied logical name, resolves
//! paths, constructs an [`ImageHandle`], applies exactly one transformation,
//! and reports the output's logical name. All work is synchronous and runs
//! to completion on the calling thread; the serving layer owns the worker
//! pool.

use crate::{
    color::BackgroundColor,
    config::StorageConfig,
    error::{RecorteError, Result},
    handle::{ImageHandle, ResizeMode},
    paths::{extension_of, split_name, ResolvedPaths},
    provision,
    segmentation::BackgroundSegmenter,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Service health summary with links to the operations the serving layer
/// exposes
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Always `"ok"` once the pipeline is constructed: provisioning already
    /// succeeded or construction would have failed
    pub status: &'static str,
    /// Operation name to route template
    pub links: HashMap<&'static str, &'static str>,
}

/// The staging and transformation façade
pub struct StagingPipeline {
    config: StorageConfig,
    segmenter: Arc<dyn BackgroundSegmenter>,
    // Per-stem locks: two requests for the same logical name share an
    // output path, so the load-transform-save span is serialized per stem.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl StagingPipeline {
    /// Create a pipeline over the given storage root, provisioning its
    /// directories immediately.
    ///
    /// # Errors
    /// - [`RecorteError::Provisioning`] if the storage directories cannot
    ///   be created; the caller must not serve requests in that case
    pub fn new(config: StorageConfig, segmenter: Arc<dyn BackgroundSegmenter>) -> Result<Self> {
        provision::ensure_directories(&config)?;
        info!(root = %config.root.display(), segmenter = segmenter.name(), "staging pipeline ready");
        Ok(Self {
            config,
            segmenter,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// The storage configuration this pipeline serves
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Store an uploaded image in the input root.
    ///
    /// Returns the stored logical name.
    ///
    /// # Errors
    /// - [`RecorteError::InvalidInput`] for an empty or non-relative name,
    ///   a disallowed extension, or a payload over the configured limit
    /// - [`RecorteError::Io`] if the write fails
    pub fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        validate_logical_name(file_name)?;

        let extension = extension_of(file_name).ok_or_else(|| {
            RecorteError::invalid_input(format!("file name has no extension: '{file_name}'"))
        })?;
        if !self.config.is_allowed_extension(extension) {
            return Err(RecorteError::invalid_input(format!(
                "extension '{extension}' is not allowed"
            )));
        }
        if bytes.len() as u64 > self.config.max_upload_bytes {
            return Err(RecorteError::invalid_input(format!(
                "upload exceeds the {} byte limit",
                self.config.max_upload_bytes
            )));
        }

        let lock = self.lock_for(file_name);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let path = self.config.input_dir().join(file_name);
        std::fs::write(&path, bytes)
            .map_err(|e| RecorteError::file_io_error("write upload to", &path, &e))?;
        info!(file = file_name, size = bytes.len(), "stored upload");
        Ok(file_name.to_string())
    }

    /// Remove the background of a previously uploaded image.
    ///
    /// Returns the output's logical name (`{stem}.png`).
    ///
    /// # Errors
    /// - [`RecorteError::InvalidInput`] for a missing or non-relative name
    /// - [`RecorteError::NotFound`] if the file is not in the input root
    /// - [`RecorteError::Io`] on decode, segmentation, or write failures
    pub fn remove_background(&self, file_name: &str) -> Result<String> {
        self.transform(file_name, "remove-background", |handle, segmenter| {
            handle.remove_background(segmenter)
        })
    }

    /// Remove the background, then composite a solid color underneath.
    ///
    /// `color` defaults to black when absent, matching the original
    /// service's behavior.
    ///
    /// # Errors
    /// - [`RecorteError::InvalidInput`] for a bad name or unparseable color
    /// - [`RecorteError::NotFound`] if the file is not in the input root
    /// - [`RecorteError::Io`] on decode, segmentation, or write failures
    pub fn add_background(&self, file_name: &str, color: Option<&str>) -> Result<String> {
        let color = match color {
            Some(spec) => spec.parse::<BackgroundColor>()?,
            None => BackgroundColor::default(),
        };
        self.transform(file_name, "add-background", move |handle, segmenter| {
            handle.add_background(segmenter, color)
        })
    }

    /// Resize a previously uploaded image (`"half"` or `"WIDTHxHEIGHT"`).
    ///
    /// # Errors
    /// - [`RecorteError::InvalidInput`] for a bad name or unrecognized mode
    /// - [`RecorteError::NotFound`] if the file is not in the input root
    /// - [`RecorteError::Io`] on decode or write failures
    pub fn resize(&self, file_name: &str, mode: &str) -> Result<String> {
        let mode = mode.parse::<ResizeMode>()?;
        self.transform(file_name, "resize", move |handle, _| handle.resize(mode))
    }

    /// Read a processed image back from the output root.
    ///
    /// Only the output root is served; the caller is expected to deliver
    /// the bytes as `image/png`.
    ///
    /// # Errors
    /// - [`RecorteError::InvalidInput`] for an empty or non-relative name
    /// - [`RecorteError::NotFound`] if the output does not exist
    pub fn fetch_output(&self, file_name: &str) -> Result<Vec<u8>> {
        validate_logical_name(file_name)?;
        let path = self.config.output_dir().join(file_name);
        if !path.exists() {
            return Err(RecorteError::not_found(file_name));
        }
        std::fs::read(&path)
            .map_err(|e| RecorteError::file_io_error("read output from", &path, &e))
    }

    /// Report service health and the operations the serving layer maps to
    /// routes
    #[must_use]
    pub fn health_check(&self) -> HealthReport {
        let links = HashMap::from([
            ("upload", "/api/upload"),
            ("remove_background", "/api/remove-background"),
            ("add_background", "/api/add-background"),
            ("download", "/api/download"),
        ]);
        HealthReport {
            status: "ok",
            links,
        }
    }

    fn transform<F>(&self, file_name: &str, operation: &'static str, apply: F) -> Result<String>
    where
        F: FnOnce(&mut ImageHandle, &dyn BackgroundSegmenter) -> Result<()>,
    {
        validate_logical_name(file_name)?;

        let paths = ResolvedPaths::resolve(&self.config, file_name);
        if !paths.input.exists() {
            warn!(file = file_name, operation, "input not found");
            return Err(RecorteError::not_found(file_name));
        }

        // Held across load-transform-save: the last writer would otherwise
        // win a race between two requests for the same stem.
        let lock = self.lock_for(file_name);
        let _guard = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut handle = ImageHandle::open(&self.config, &paths.input)?;
        apply(&mut handle, self.segmenter.as_ref())?;
        handle.save()?;

        let output = handle.output_file_name();
        info!(file = file_name, operation, output = %output, "transformation complete");
        Ok(output)
    }

    /// Fetch (or create) the lock for a logical name's stem. `teste.jpg`
    /// and `teste.png` contend for the same output path and so share a
    /// lock. The caller locks the returned handle for the duration of its
    /// load-transform-save span.
    fn lock_for(&self, file_name: &str) -> Arc<Mutex<()>> {
        let (stem, _) = split_name(file_name);
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(locks.entry(stem.to_string()).or_default())
    }
}

/// Validate the relative-name discipline: caller-supplied names are
/// logical, interpreted relative to a managed root, and never arbitrary
/// filesystem paths.
fn validate_logical_name(file_name: &str) -> Result<()> {
    if file_name.trim().is_empty() {
        return Err(RecorteError::invalid_input("file name must be non-empty"));
    }
    if file_name.contains(['/', '\\']) || file_name.contains("..") {
        return Err(RecorteError::invalid_input(format!(
            "file name must be a bare name, not a path: '{file_name}'"
        )));
    }
    Ok(())
}
