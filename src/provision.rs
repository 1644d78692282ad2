//! Storage directory provisioning
//!
//! Runs once at process start, before any request is served. Creation is
//! idempotent and safe under concurrent invocation from multiple process
//! instances sharing one storage root: a directory that already exists is
//! success, not failure.

use crate::{
    config::StorageConfig,
    error::{RecorteError, Result},
};
use tracing::debug;

/// Ensure the input, output, and originals directories exist.
///
/// # Errors
/// - [`RecorteError::Provisioning`] on genuine filesystem errors
///   (permission denied, invalid root path, disk full). This failure is
///   fatal to startup: the serving layer must refuse requests until
///   provisioning succeeds.
pub fn ensure_directories(config: &StorageConfig) -> Result<()> {
    let directories = [
        config.input_dir(),
        config.output_dir(),
        config.originals_dir(),
    ];
    for directory in &directories {
        std::fs::create_dir_all(directory).map_err(|e| {
            RecorteError::provisioning(format!(
                "failed to create directory '{}': {e}",
                directory.display()
            ))
        })?;
        debug!(directory = %directory.display(), "storage directory is ready");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn creates_all_directories() {
        let root = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(root.path()).unwrap();

        ensure_directories(&config).unwrap();

        assert!(config.input_dir().is_dir());
        assert!(config.output_dir().is_dir());
        assert!(config.originals_dir().is_dir());
    }

    #[test]
    fn is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(root.path()).unwrap();

        ensure_directories(&config).unwrap();
        ensure_directories(&config).unwrap();

        assert!(config.input_dir().is_dir());
    }

    #[test]
    fn tolerates_concurrent_provisioning() {
        let root = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(root.path()).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| ensure_directories(&config).unwrap());
            }
        });

        assert!(config.input_dir().is_dir());
        assert!(config.output_dir().is_dir());
        assert!(config.originals_dir().is_dir());
    }

    #[test]
    fn fails_with_provisioning_kind_on_bad_root() {
        // A regular file where a directory is required is a genuine error.
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("imagens");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let config = StorageConfig::new(root.path()).unwrap();
        let err = ensure_directories(&config).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Provisioning);
    }
}
