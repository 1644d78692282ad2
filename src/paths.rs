//! Canonical path resolution for managed images
//!
//! Pure functions only: resolution performs no I/O and has no failure modes
//! of its own. Because [`StorageConfig`] is immutable, the same logical name
//! always resolves to the same three paths for the lifetime of the process.

use crate::config::StorageConfig;
use std::path::PathBuf;

/// The three canonical locations derived for one logical file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Source bytes: `{input_root}/{fullName}`
    pub input: PathBuf,
    /// Transformed result: `{output_root}/{baseName}.png` — output is
    /// always normalized to PNG regardless of the input format
    pub output: PathBuf,
    /// Archived original: `{originals_root}/{fullName}`
    pub originals: PathBuf,
}

impl ResolvedPaths {
    /// Resolve a logical file name against the storage root
    #[must_use]
    pub fn resolve(config: &StorageConfig, file_name: &str) -> Self {
        let (base_name, full_name) = split_name(file_name);
        Self {
            input: config.input_dir().join(full_name),
            output: config.output_dir().join(format!("{base_name}.png")),
            originals: config.originals_dir().join(full_name),
        }
    }
}

/// Split a file name into stem and full name.
///
/// Takes the final path segment (recognizing both `/` and `\` so the split
/// behaves identically regardless of host platform) and cuts at the last
/// `.`. A name without a dot keeps its stem equal to the full name.
#[must_use]
pub fn split_name(file_name: &str) -> (&str, &str) {
    let full = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let base = match full.rfind('.') {
        Some(idx) => full.get(..idx).unwrap_or(full),
        None => full,
    };
    (base, full)
}

/// Extract the extension of a logical file name, if any (without the dot)
#[must_use]
pub fn extension_of(file_name: &str) -> Option<&str> {
    let (base, full) = split_name(file_name);
    if base.len() == full.len() {
        None
    } else {
        full.get(base.len() + 1..)
    }
}
