pub mod locator;
pub mod paths;
pub mod resolver;

pub use locator::list_options_files;
pub use paths::{is_supported_config_path, path_exists, sanitize};
pub use resolver::{resolve_bin_dir, validate_config_dir};

/// Suffix of the per-product JVM options files, compared lower-cased.
pub const OPTIONS_SUFFIX: &str = ".vmoptions";

/// Marker file every config directory must contain.
pub const REQUIRED_AGENT_JAR: &str = "ja-netfilter.jar";

pub(crate) fn is_options_file_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy()
        .to_lowercase()
        .ends_with(OPTIONS_SUFFIX)
}
