use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the helper backend.
/// Every module returns `Result<T, HelperError>`.
#[derive(Debug, Error)]
pub enum HelperError {
    // ── Path validation ─────────────────────────────────
    #[error("path must not be empty")]
    EmptyPath,

    #[error("path does not exist: {0:?}")]
    PathNotFound(PathBuf),

    #[error("path must be a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("not a JetBrains IDE installation path: {0:?}")]
    NotRecognizedInstallation(PathBuf),

    #[error("no .vmoptions files found in {0:?}")]
    NoOptionsFiles(PathBuf),

    #[error("config directory {dir:?} is missing the required file {file}")]
    MissingRequiredFile { dir: PathBuf, file: &'static str },

    #[error("config directory path contains unsupported characters: {0}")]
    InvalidConfigPath(String),

    // ── Permissions ─────────────────────────────────────
    #[error("permission denied: no {operation} access to {path:?}\n{hint}")]
    PermissionDenied {
        path: PathBuf,
        operation: &'static str,
        hint: &'static str,
    },

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to {action} {file}: {source}")]
    FileFailed {
        action: &'static str,
        file: String,
        source: Box<HelperError>,
    },

    // ── Environment ─────────────────────────────────────
    #[error("failed to remove environment variables: {0}")]
    EnvCleanup(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API {url} returned HTTP {status}")]
    ApiStatus { url: String, status: u16 },

    #[error("all release API mirrors are unavailable: {last}")]
    AllMirrorsFailed { last: Box<HelperError> },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Settings ────────────────────────────────────────
    #[error("settings error: {0}")]
    Settings(String),
}

/// Convenience alias used throughout the crate.
pub type HelperResult<T> = Result<T, HelperError>;

impl From<std::io::Error> for HelperError {
    fn from(source: std::io::Error) -> Self {
        HelperError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl HelperError {
    /// Wrap a per-file failure with the file's base name.
    pub fn for_file(action: &'static str, path: &std::path::Path, source: HelperError) -> Self {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        HelperError::FileFailed {
            action,
            file,
            source: Box::new(source),
        }
    }
}

// ── Serialization for JSON output ───────────────────────
// Payloads printed with `--json` carry the error as its display string.
impl serde::Serialize for HelperError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
