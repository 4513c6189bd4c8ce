use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::env::{self, EnvCleanup};
use crate::core::error::{HelperError, HelperResult};
use crate::core::http::{build_http_client, HTTP_TIMEOUT};
use crate::core::patch::OwnedFlags;
use crate::core::update::{UpdateChecker, UpdateConfig};

const APP_DIR_NAME: &str = "IdeConfigHelper";
const SETTINGS_FILE: &str = "settings.json";

/// Paths remembered between runs so they can be omitted next time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperSettings {
    #[serde(default)]
    pub last_ide_path: Option<PathBuf>,
    #[serde(default)]
    pub last_config_path: Option<PathBuf>,
}

/// Everything a command needs, built once at startup.
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings: HelperSettings,
    pub flags: OwnedFlags,
    pub env_cleanup: Box<dyn EnvCleanup + Send + Sync>,
    pub update_checker: UpdateChecker,
}

impl AppState {
    pub fn new(data_dir: Option<PathBuf>) -> HelperResult<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let http_client = build_http_client(HTTP_TIMEOUT)?;

        Ok(Self::with_parts(
            data_dir,
            env::platform_env_cleanup(env::default_var_names()),
            UpdateChecker::new(http_client, UpdateConfig::default()),
        ))
    }

    pub fn with_parts(
        data_dir: PathBuf,
        env_cleanup: Box<dyn EnvCleanup + Send + Sync>,
        update_checker: UpdateChecker,
    ) -> Self {
        let settings = load_settings_from_disk(&data_dir).unwrap_or_default();
        debug!("Using data directory {:?}", data_dir);

        Self {
            data_dir,
            settings,
            flags: OwnedFlags::default(),
            env_cleanup,
            update_checker,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn save_settings(&self) -> HelperResult<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| HelperError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(&self.settings)?;
        let path = self.settings_path();
        std::fs::write(&path, json).map_err(|source| HelperError::Io { path, source })
    }
}

fn load_settings_from_disk(data_dir: &Path) -> Option<HelperSettings> {
    let path = data_dir.join(SETTINGS_FILE);
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::env::NoopEnvCleanup;

    fn state_in(dir: &Path) -> AppState {
        AppState::with_parts(
            dir.to_path_buf(),
            Box::new(NoopEnvCleanup),
            UpdateChecker::new(reqwest::Client::new(), UpdateConfig::default()),
        )
    }

    #[test]
    fn settings_round_trip_through_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested");

        let mut state = state_in(&data_dir);
        assert_eq!(state.settings, HelperSettings::default());

        state.settings.last_ide_path = Some(PathBuf::from("/opt/idea"));
        state.save_settings().unwrap();

        let reloaded = state_in(&data_dir);
        assert_eq!(reloaded.settings.last_ide_path, Some(PathBuf::from("/opt/idea")));
        assert_eq!(reloaded.settings.last_config_path, None);
    }

    #[test]
    fn corrupt_settings_fall_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{not json").unwrap();
        assert_eq!(state_in(dir.path()).settings, HelperSettings::default());
    }
}
