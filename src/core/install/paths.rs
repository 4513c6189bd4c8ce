use std::path::{Component, Path, PathBuf};

use crate::core::error::{HelperError, HelperResult};

/// Trim and lexically clean a user-supplied path.
///
/// Returns an empty `PathBuf` for blank input; callers treat that as a missing
/// path. Nothing here touches the filesystem.
pub fn sanitize(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return PathBuf::new();
    }
    clean(Path::new(trimmed))
}

/// Collapse redundant separators, `.` segments and `..` segments that follow a
/// normal segment. `..` directly under a root is dropped.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Lightweight existence check on a raw path.
///
/// Missing paths are `Ok(false)`; anything else that stops the stat is an error.
pub fn path_exists(raw: &str) -> HelperResult<bool> {
    let cleaned = sanitize(raw);
    if cleaned.as_os_str().is_empty() {
        return Err(HelperError::EmptyPath);
    }

    match std::fs::metadata(&cleaned) {
        Ok(_) => Ok(true),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(HelperError::Io {
            path: cleaned,
            source,
        }),
    }
}

/// The config directory ends up verbatim inside a `-javaagent:` flag, so only
/// characters the IDE launcher parses safely are accepted.
pub fn is_supported_config_path(raw: &str) -> bool {
    !raw.is_empty()
        && raw.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, ':' | '\\' | '/' | '_' | '-' | '.')
        })
}
