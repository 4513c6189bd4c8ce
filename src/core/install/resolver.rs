// ─── Installation Resolver ───
// Turns a user-supplied IDE path into the `bin` directory holding the
// `.vmoptions` files. Accepts either the install root or `bin` itself.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{is_options_file_name, REQUIRED_AGENT_JAR};
use crate::core::error::{HelperError, HelperResult};

/// Resolve the IDE `bin` directory for `path`.
///
/// `NotRecognizedInstallation` means the directory exists but does not look
/// like an IDE install: no `bin`, or a `bin` without any options file.
pub fn resolve_bin_dir(path: &Path) -> HelperResult<PathBuf> {
    require_dir(path)?;

    let is_bin = path
        .file_name()
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case("bin"))
        .unwrap_or(false);

    let candidate = if is_bin {
        path.to_path_buf()
    } else {
        let joined = path.join("bin");
        match std::fs::metadata(&joined) {
            Ok(meta) if meta.is_dir() => joined,
            Ok(_) => return Err(HelperError::NotRecognizedInstallation(path.to_path_buf())),
            Err(source) if source.kind() == ErrorKind::NotFound => {
                return Err(HelperError::NotRecognizedInstallation(path.to_path_buf()));
            }
            Err(source) => {
                return Err(HelperError::Io {
                    path: joined,
                    source,
                })
            }
        }
    };

    if !has_options_file(&candidate)? {
        return Err(HelperError::NotRecognizedInstallation(path.to_path_buf()));
    }

    debug!("Resolved IDE bin directory: {:?}", candidate);
    Ok(candidate)
}

/// Check that `dir` exists, is a directory and holds the agent jar.
pub fn validate_config_dir(dir: &Path) -> HelperResult<()> {
    require_dir(dir)?;

    let jar = dir.join(REQUIRED_AGENT_JAR);
    match std::fs::metadata(&jar) {
        Ok(_) => Ok(()),
        Err(source) if source.kind() == ErrorKind::NotFound => {
            Err(HelperError::MissingRequiredFile {
                dir: dir.to_path_buf(),
                file: REQUIRED_AGENT_JAR,
            })
        }
        Err(source) => Err(HelperError::Io { path: jar, source }),
    }
}

fn require_dir(path: &Path) -> HelperResult<()> {
    let meta = std::fs::metadata(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            HelperError::PathNotFound(path.to_path_buf())
        } else {
            HelperError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if !meta.is_dir() {
        return Err(HelperError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

fn has_options_file(dir: &Path) -> HelperResult<bool> {
    let entries = std::fs::read_dir(dir).map_err(|source| HelperError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| HelperError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir && is_options_file_name(&entry.file_name()) {
            return Ok(true);
        }
    }
    Ok(false)
}
