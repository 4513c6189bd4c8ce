pub mod checker;
pub mod version;

pub use checker::{AssetInfo, ReleaseInfo, UpdateCheckResult, UpdateChecker, UpdateConfig};
pub use version::{compare_versions, format_file_size};
