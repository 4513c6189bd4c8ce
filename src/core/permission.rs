// ─── Permission Probe ───
// Pre-flight access checks run before any options file is touched. Each probe
// opens the target with the narrowest mode it needs and drops the handle
// immediately; nothing is held across the later read/write.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::error::{HelperError, HelperResult};

#[cfg(target_os = "windows")]
const ELEVATION_HINT: &str = "Please run this program as Administrator.";

#[cfg(not(target_os = "windows"))]
const ELEVATION_HINT: &str = "Please re-run with sudo or as root.";

pub fn check_file_read(path: &Path) -> HelperResult<()> {
    probe(path, "read", OpenOptions::new().read(true))
}

/// Opens for writing without truncating or creating.
pub fn check_file_write(path: &Path) -> HelperResult<()> {
    probe(path, "write", OpenOptions::new().write(true))
}

pub fn check_dir_read(path: &Path) -> HelperResult<()> {
    match std::fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(source) => Err(classify(path, "read", source)),
    }
}

fn probe(path: &Path, operation: &'static str, options: &OpenOptions) -> HelperResult<()> {
    match options.open(path) {
        Ok(_file) => Ok(()),
        Err(source) => Err(classify(path, operation, source)),
    }
}

fn classify(path: &Path, operation: &'static str, source: std::io::Error) -> HelperError {
    if source.kind() == ErrorKind::PermissionDenied {
        permission_denied(path, operation)
    } else {
        HelperError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Permission error carrying the platform's privilege-escalation hint.
pub fn permission_denied(path: &Path, operation: &'static str) -> HelperError {
    HelperError::PermissionDenied {
        path: path.to_path_buf(),
        operation,
        hint: ELEVATION_HINT,
    }
}
