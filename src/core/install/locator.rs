use std::path::{Path, PathBuf};

use tracing::debug;

use super::is_options_file_name;
use crate::core::error::{HelperError, HelperResult};
use crate::core::permission;

/// List every `.vmoptions` file directly inside `bin_dir`.
///
/// Order follows directory enumeration and is not stable across platforms.
/// An empty result is returned as-is; the caller decides whether that is fatal.
pub fn list_options_files(bin_dir: &Path) -> HelperResult<Vec<PathBuf>> {
    permission::check_dir_read(bin_dir)?;

    let entries = std::fs::read_dir(bin_dir).map_err(|source| HelperError::Io {
        path: bin_dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| HelperError::Io {
            path: bin_dir.to_path_buf(),
            source,
        })?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir && is_options_file_name(&entry.file_name()) {
            files.push(entry.path());
        }
    }

    debug!("Found {} options file(s) in {:?}", files.len(), bin_dir);
    Ok(files)
}
