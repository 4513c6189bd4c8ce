use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::core::env::CleanupOutcome;
use crate::core::error::{HelperError, HelperResult};
use crate::core::install;
use crate::core::patch::{self, PatchReport};
use crate::core::state::AppState;
use crate::core::update::UpdateCheckResult;

pub const APP_NAME: &str = "IDE Config Helper";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const REPO_URL: &str = "https://github.com/XgzK/intellijapp";

#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub file: String,
    #[serde(flatten)]
    pub report: PatchReport,
}

/// Result of an apply or clear request.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub message: String,
    pub processed: usize,
    pub files: Vec<FileOutcome>,
    pub env: CleanupOutcome,
}

#[derive(Debug, Serialize)]
pub struct Developer {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct AboutInfo {
    pub app_name: String,
    pub version: String,
    pub platform: String,
    pub repo_url: String,
    pub developers: Vec<Developer>,
}

#[derive(Debug, Serialize)]
pub struct PathExistsResponse {
    pub path: String,
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct MirrorResponse {
    pub url: String,
}

/// Fill in an omitted path from the one remembered in settings.
pub fn remembered_or(raw: Option<String>, remembered: Option<&PathBuf>) -> String {
    raw.or_else(|| remembered.map(|p| p.to_string_lossy().to_string()))
        .unwrap_or_default()
}

/// Validate both paths, then inject the owned flags into every options file.
pub fn apply_config(
    state: &mut AppState,
    ide_path: &str,
    config_path: &str,
) -> HelperResult<ConfigResponse> {
    info!(ide_path, config_path, "Applying configuration");

    let ide_path = install::sanitize(ide_path);
    let config_path = install::sanitize(config_path);
    if ide_path.as_os_str().is_empty() || config_path.as_os_str().is_empty() {
        warn!("Path validation failed: empty path");
        return Err(HelperError::EmptyPath);
    }

    let config_raw = config_path.to_string_lossy().to_string();
    if !install::is_supported_config_path(&config_raw) {
        return Err(HelperError::InvalidConfigPath(config_raw));
    }

    install::validate_config_dir(&config_path).inspect_err(|e| {
        error!("Config directory validation failed: {}", e);
    })?;
    let files = locate_options_files(&ide_path)?;

    let mut outcomes = Vec::with_capacity(files.len());
    for file in &files {
        let report = patch::apply(file, &config_path, &state.flags).map_err(|e| {
            error!("Failed to process {:?}: {}", file, e);
            HelperError::for_file("apply configuration to", file, e)
        })?;
        outcomes.push(file_outcome(file, report));
    }
    info!("Configuration applied to {} file(s)", outcomes.len());

    state.settings.last_ide_path = Some(ide_path);
    state.settings.last_config_path = Some(config_path);
    remember(state);

    let env = remove_env_overrides(state, outcomes.len())?;

    let message = with_warning(
        format!(
            "Configuration applied to {} file(s). Restart the IDE to take effect.",
            outcomes.len()
        ),
        &env,
    );
    Ok(ConfigResponse {
        message,
        processed: outcomes.len(),
        files: outcomes,
        env,
    })
}

/// Remove the owned flags from every options file of the installation.
pub fn clear_config(state: &mut AppState, ide_path: &str) -> HelperResult<ConfigResponse> {
    info!(ide_path, "Clearing configuration");

    let ide_path = install::sanitize(ide_path);
    if ide_path.as_os_str().is_empty() {
        warn!("Path validation failed: empty path");
        return Err(HelperError::EmptyPath);
    }

    let files = locate_options_files(&ide_path)?;

    let mut outcomes = Vec::with_capacity(files.len());
    for file in &files {
        let report = patch::clear(file, &state.flags).map_err(|e| {
            error!("Failed to clear {:?}: {}", file, e);
            HelperError::for_file("clear configuration from", file, e)
        })?;
        outcomes.push(file_outcome(file, report));
    }
    info!("Configuration cleared from {} file(s)", outcomes.len());

    state.settings.last_ide_path = Some(ide_path);
    remember(state);

    let env = remove_env_overrides(state, outcomes.len())?;

    let message = with_warning(
        format!("Configuration cleared from {} file(s).", outcomes.len()),
        &env,
    );
    Ok(ConfigResponse {
        message,
        processed: outcomes.len(),
        files: outcomes,
        env,
    })
}

pub fn path_exists(raw: &str) -> HelperResult<PathExistsResponse> {
    let exists = install::path_exists(raw)?;
    Ok(PathExistsResponse {
        path: install::sanitize(raw).to_string_lossy().to_string(),
        exists,
    })
}

pub fn get_about_info() -> AboutInfo {
    AboutInfo {
        app_name: APP_NAME.to_string(),
        version: APP_VERSION.to_string(),
        platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
        repo_url: REPO_URL.to_string(),
        developers: vec![Developer {
            name: "XgzK".into(),
            url: "https://github.com/XgzK".into(),
        }],
    }
}

pub async fn check_for_updates(
    state: &AppState,
    current_version: Option<&str>,
) -> HelperResult<UpdateCheckResult> {
    let current = current_version.unwrap_or(APP_VERSION);
    state
        .update_checker
        .check_for_update(current)
        .await
        .inspect_err(|e| error!("Update check failed: {}", e))
}

pub async fn get_accessible_mirror(state: &AppState) -> MirrorResponse {
    MirrorResponse {
        url: state.update_checker.resolve_accessible_mirror().await,
    }
}

pub async fn convert_to_accessible_url(state: &AppState, url: &str) -> MirrorResponse {
    MirrorResponse {
        url: state.update_checker.convert_to_accessible_url(url).await,
    }
}

fn locate_options_files(ide_path: &Path) -> HelperResult<Vec<PathBuf>> {
    let bin_dir = install::resolve_bin_dir(ide_path).inspect_err(|e| {
        error!("IDE path validation failed: {}", e);
    })?;

    let files = install::list_options_files(&bin_dir)?;
    if files.is_empty() {
        return Err(HelperError::NoOptionsFiles(bin_dir));
    }
    info!("Found {} options file(s)", files.len());
    Ok(files)
}

fn file_outcome(file: &Path, report: PatchReport) -> FileOutcome {
    FileOutcome {
        file: file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        report,
    }
}

// Runs after every file is written, so a failure here must say so.
fn remove_env_overrides(state: &AppState, processed: usize) -> HelperResult<CleanupOutcome> {
    state.env_cleanup.remove_overrides().map_err(|e| match e {
        HelperError::EnvCleanup(detail) => HelperError::EnvCleanup(format!(
            "{detail} ({processed} options file(s) were already updated)"
        )),
        other => other,
    })
}

fn with_warning(message: String, env: &CleanupOutcome) -> String {
    match &env.warning {
        Some(warning) => format!("{message}\nWarning: {warning}"),
        None => message,
    }
}

// Best-effort: a failed save is only logged.
fn remember(state: &AppState) {
    if let Err(e) = state.save_settings() {
        warn!("Could not save settings to {:?}: {}", state.settings_path(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::core::env::{EnvCleanup, NoopEnvCleanup};
    use crate::core::install::REQUIRED_AGENT_JAR;
    use crate::core::update::{UpdateChecker, UpdateConfig};

    struct Fixture {
        _root: tempfile::TempDir,
        ide: PathBuf,
        bin: PathBuf,
        config: PathBuf,
        data: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let ide = root.path().join("IntelliJ-IDEA");
        let bin = ide.join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("idea64.vmoptions"), "-Xms128m\n-Xmx2048m\n").unwrap();
        fs::write(bin.join("idea.vmoptions"), "-Xms128m\n-Xmx750m\n").unwrap();
        fs::write(bin.join("idea.properties"), "idea.config.path=x\n").unwrap();

        let config = root.path().join("jetbra");
        fs::create_dir(&config).unwrap();
        fs::write(config.join(REQUIRED_AGENT_JAR), b"jar").unwrap();

        let data = root.path().join("data");
        Fixture {
            _root: root,
            ide,
            bin,
            config,
            data,
        }
    }

    fn state_with(data: &Path, cleanup: Box<dyn EnvCleanup + Send + Sync>) -> AppState {
        AppState::with_parts(
            data.to_path_buf(),
            cleanup,
            UpdateChecker::new(reqwest::Client::new(), UpdateConfig::default()),
        )
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    struct WarningCleanup;

    impl EnvCleanup for WarningCleanup {
        fn remove_overrides(&self) -> HelperResult<CleanupOutcome> {
            Ok(CleanupOutcome {
                removed: 1,
                warning: Some("re-run elevated".into()),
            })
        }
    }

    struct CountingCleanup(Arc<AtomicUsize>);

    impl EnvCleanup for CountingCleanup {
        fn remove_overrides(&self) -> HelperResult<CleanupOutcome> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(CleanupOutcome::default())
        }
    }

    struct FailingCleanup;

    impl EnvCleanup for FailingCleanup {
        fn remove_overrides(&self) -> HelperResult<CleanupOutcome> {
            Err(HelperError::EnvCleanup("user: IDEA_VM_OPTIONS: access denied".into()))
        }
    }

    #[test]
    fn apply_reports_every_options_file() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(NoopEnvCleanup));

        let response = apply_config(&mut state, &path_str(&fx.ide), &path_str(&fx.config)).unwrap();
        assert_eq!(response.processed, 2);
        assert!(response.message.contains("2 file(s)"));
        assert!(!response.message.contains("Warning"));

        let agent = state.flags.agent_line(&fx.config);
        for name in ["idea64.vmoptions", "idea.vmoptions"] {
            let content = fs::read_to_string(fx.bin.join(name)).unwrap();
            let lines: Vec<&str> = content.lines().collect();
            let tail = &lines[lines.len() - 3..];
            assert_eq!(tail[0], state.flags.open_module_lines()[0]);
            assert_eq!(tail[1], state.flags.open_module_lines()[1]);
            assert_eq!(tail[2], agent);
        }
        assert_eq!(
            fs::read_to_string(fx.bin.join("idea.properties")).unwrap(),
            "idea.config.path=x\n"
        );
    }

    #[test]
    fn apply_then_clear_round_trip() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(NoopEnvCleanup));

        apply_config(&mut state, &path_str(&fx.ide), &path_str(&fx.config)).unwrap();
        let response = clear_config(&mut state, &path_str(&fx.bin)).unwrap();
        assert_eq!(response.processed, 2);
        assert!(response.files.iter().all(|f| f.report.removed == 3));

        assert_eq!(
            fs::read_to_string(fx.bin.join("idea64.vmoptions")).unwrap(),
            "-Xms128m\n-Xmx2048m"
        );
    }

    #[test]
    fn apply_remembers_paths() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(NoopEnvCleanup));

        let raw_ide = format!("  {}  ", path_str(&fx.ide));
        apply_config(&mut state, &raw_ide, &path_str(&fx.config)).unwrap();

        let reloaded = state_with(&fx.data, Box::new(NoopEnvCleanup));
        assert_eq!(reloaded.settings.last_ide_path.as_ref(), Some(&fx.ide));
        assert_eq!(reloaded.settings.last_config_path.as_ref(), Some(&fx.config));
        assert_eq!(remembered_or(None, reloaded.settings.last_ide_path.as_ref()), path_str(&fx.ide));
        assert_eq!(remembered_or(Some("x".into()), reloaded.settings.last_ide_path.as_ref()), "x");
    }

    #[test]
    fn cleanup_warning_is_appended_to_message() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(WarningCleanup));

        let response = clear_config(&mut state, &path_str(&fx.ide)).unwrap();
        assert_eq!(
            response.message,
            "Configuration cleared from 2 file(s).\nWarning: re-run elevated"
        );
    }

    #[test]
    fn empty_paths_fail_before_touching_anything() {
        let fx = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut state = state_with(&fx.data, Box::new(CountingCleanup(calls.clone())));

        assert!(matches!(
            apply_config(&mut state, "   ", &path_str(&fx.config)),
            Err(HelperError::EmptyPath)
        ));
        assert!(matches!(
            apply_config(&mut state, &path_str(&fx.ide), ""),
            Err(HelperError::EmptyPath)
        ));
        assert!(matches!(clear_config(&mut state, ""), Err(HelperError::EmptyPath)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!fx.data.exists());
    }

    #[test]
    fn invalid_config_dir_aborts_without_patching() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(NoopEnvCleanup));
        fs::remove_file(fx.config.join(REQUIRED_AGENT_JAR)).unwrap();

        let err = apply_config(&mut state, &path_str(&fx.ide), &path_str(&fx.config)).unwrap_err();
        assert!(matches!(err, HelperError::MissingRequiredFile { .. }));
        assert_eq!(
            fs::read_to_string(fx.bin.join("idea64.vmoptions")).unwrap(),
            "-Xms128m\n-Xmx2048m\n"
        );
    }

    #[test]
    fn unsupported_config_characters_are_rejected() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(NoopEnvCleanup));
        let err = apply_config(&mut state, &path_str(&fx.ide), "/tmp/jet;bra").unwrap_err();
        assert!(matches!(err, HelperError::InvalidConfigPath(_)));
    }

    #[test]
    fn non_installation_directory_is_rejected() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(NoopEnvCleanup));
        let err = clear_config(&mut state, &path_str(&fx.config)).unwrap_err();
        assert!(matches!(err, HelperError::NotRecognizedInstallation(_)));
    }

    #[test]
    fn env_cleanup_runs_once_per_request() {
        let fx = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut state = state_with(&fx.data, Box::new(CountingCleanup(calls.clone())));

        apply_config(&mut state, &path_str(&fx.ide), &path_str(&fx.config)).unwrap();
        clear_config(&mut state, &path_str(&fx.ide)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn about_info_carries_package_version() {
        let about = get_about_info();
        assert_eq!(about.version, APP_VERSION);
        assert_eq!(about.repo_url, REPO_URL);
        assert!(!about.developers.is_empty());
    }

    #[test]
    fn path_exists_response() {
        let fx = fixture();
        let response = path_exists(&path_str(&fx.ide)).unwrap();
        assert!(response.exists);
        assert!(!path_exists(&path_str(&fx.ide.join("nope"))).unwrap().exists);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_options_file_aborts_the_batch() {
        let fx = fixture();
        std::os::unix::fs::symlink(
            fx.bin.join("missing-target"),
            fx.bin.join("broken.vmoptions"),
        )
        .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut state = state_with(&fx.data, Box::new(CountingCleanup(calls.clone())));

        let err = apply_config(&mut state, &path_str(&fx.ide), &path_str(&fx.config)).unwrap_err();
        match &err {
            HelperError::FileFailed { action, file, .. } => {
                assert_eq!(*action, "apply configuration to");
                assert_eq!(file, "broken.vmoptions");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("broken.vmoptions"));

        // Nothing after the failing file runs.
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!fx.data.exists());
        assert!(state.settings.last_ide_path.is_none());

        let err = clear_config(&mut state, &path_str(&fx.ide)).unwrap_err();
        assert!(matches!(err, HelperError::FileFailed { ref file, .. } if file == "broken.vmoptions"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn env_failure_still_remembers_patched_paths() {
        let fx = fixture();
        let mut state = state_with(&fx.data, Box::new(FailingCleanup));

        let err = apply_config(&mut state, &path_str(&fx.ide), &path_str(&fx.config)).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, HelperError::EnvCleanup(_)));
        assert!(message.contains("access denied"));
        assert!(message.contains("2 options file(s) were already updated"));

        let content = fs::read_to_string(fx.bin.join("idea64.vmoptions")).unwrap();
        assert!(content.ends_with(&state.flags.agent_line(&fx.config)));

        let reloaded = state_with(&fx.data, Box::new(NoopEnvCleanup));
        assert_eq!(reloaded.settings.last_ide_path.as_ref(), Some(&fx.ide));
        assert_eq!(reloaded.settings.last_config_path.as_ref(), Some(&fx.config));
    }
}
