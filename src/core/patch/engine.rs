// ─── Patch Engine ───
// Whole-file rewrite of a single options file. The new content is computed in
// memory first and written back with one call, so a failed read never leads
// to a half-written file.
//
// Content is handled as raw bytes. Options files may carry comments in a
// local code page, and every line the helper does not own is written back
// byte for byte.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::flags::OwnedFlags;
use crate::core::error::{HelperError, HelperResult};
use crate::core::permission;

/// What a single apply/clear did to one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatchReport {
    pub removed: usize,
    pub appended: usize,
}

/// Access check run before a file is read.
type Probe = fn(&Path) -> HelperResult<()>;

/// Inject the owned flags into `file`, replacing any earlier agent or
/// open-module lines. Running it twice yields the same content.
pub fn apply(file: &Path, config_dir: &Path, flags: &OwnedFlags) -> HelperResult<PatchReport> {
    let report = rewrite(file, probe_read_write, |content| {
        apply_to_content(content, config_dir, flags)
    })?;

    debug!(
        "Applied flags to {:?} (removed {}, appended {})",
        file, report.removed, report.appended
    );
    Ok(report)
}

/// Remove only the lines this tool owns, then trim trailing blank lines.
pub fn clear(file: &Path, flags: &OwnedFlags) -> HelperResult<PatchReport> {
    let report = rewrite(file, probe_read_write, |content| clear_content(content, flags))?;

    debug!("Cleared {:?} (removed {})", file, report.removed);
    Ok(report)
}

pub fn apply_to_content(
    content: &[u8],
    config_dir: &Path,
    flags: &OwnedFlags,
) -> (Vec<u8>, PatchReport) {
    let mut report = PatchReport::default();
    let mut lines: Vec<&[u8]> = Vec::new();

    for line in content.split(|b| *b == b'\n') {
        if OwnedFlags::is_managed_prefix(line) {
            debug!("Dropping line: {}", String::from_utf8_lossy(line.trim_ascii()));
            report.removed += 1;
        } else {
            lines.push(line);
        }
    }

    let injected = flags.injected_lines(config_dir);
    report.appended = injected.len();
    lines.extend(injected.iter().map(|l| l.as_bytes()));

    (lines.join(&b'\n'), report)
}

pub fn clear_content(content: &[u8], flags: &OwnedFlags) -> (Vec<u8>, PatchReport) {
    let marker = flags.agent_marker();
    let mut report = PatchReport::default();

    let mut lines: Vec<&[u8]> = content
        .split(|b| *b == b'\n')
        .filter(|line| {
            let owned = flags.is_owned(line, marker.as_bytes());
            if owned {
                debug!("Dropping line: {}", String::from_utf8_lossy(line.trim_ascii()));
                report.removed += 1;
            }
            !owned
        })
        .collect();

    while lines.last().is_some_and(|l| l.trim_ascii().is_empty()) {
        lines.pop();
    }

    (lines.join(&b'\n'), report)
}

fn probe_read_write(file: &Path) -> HelperResult<()> {
    permission::check_file_read(file)?;
    permission::check_file_write(file)
}

// The probe runs first; a failing probe leaves the file unread and unwritten.
fn rewrite(
    file: &Path,
    probe: Probe,
    transform: impl FnOnce(&[u8]) -> (Vec<u8>, PatchReport),
) -> HelperResult<PatchReport> {
    probe(file)?;

    let content = std::fs::read(file).map_err(|source| HelperError::ReadFile {
        path: file.to_path_buf(),
        source,
    })?;
    let (patched, report) = transform(&content);

    std::fs::write(file, patched).map_err(|source| HelperError::WriteFile {
        path: file.to_path_buf(),
        source,
    })?;
    Ok(report)
}
