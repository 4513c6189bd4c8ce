// ─── Environment Cleanup ───
// Legacy installs point the IDE launcher at an alternate options file through
// `<PRODUCT>_VM_OPTIONS`. Those overrides are removed best-effort: user scope
// always, system scope only with elevation.
//
// Only Windows stores these persistently (registry); other platforms get the
// no-op implementation chosen at compile time.

#[cfg(windows)]
pub mod windows;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::error::{HelperError, HelperResult};

/// Product keys whose `*_VM_OPTIONS` override is removed.
pub const JETBRAINS_PRODUCTS: &[&str] = &[
    "idea",
    "clion",
    "phpstorm",
    "goland",
    "pycharm",
    "webstorm",
    "webide",
    "rider",
    "datagrip",
    "rubymine",
    "dataspell",
    "aqua",
    "rustrover",
    "gateway",
    "jetbrains_client",
    "jetbrainsclient",
    "studio",
    "devecostudio",
];

const ENV_VAR_SUFFIX: &str = "_VM_OPTIONS";

pub fn env_var_name(product: &str) -> String {
    format!("{}{}", product.to_uppercase(), ENV_VAR_SUFFIX)
}

/// Variable names for every known product, in product-list order.
pub fn default_var_names() -> Vec<String> {
    JETBRAINS_PRODUCTS.iter().map(|p| env_var_name(p)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub removed: usize,
    /// Set when something was skipped or only partly removed.
    pub warning: Option<String>,
}

/// Capability: remove the product override variables from persistent storage.
pub trait EnvCleanup {
    fn remove_overrides(&self) -> HelperResult<CleanupOutcome>;
}

/// Platforms without persistent variable storage.
#[derive(Debug, Default)]
pub struct NoopEnvCleanup;

impl EnvCleanup for NoopEnvCleanup {
    fn remove_overrides(&self) -> HelperResult<CleanupOutcome> {
        debug!("No persistent environment storage on this platform, skipping cleanup");
        Ok(CleanupOutcome::default())
    }
}

/// One storage tier (user or system) of environment variables.
pub trait VarStore {
    fn contains(&self, name: &str) -> std::io::Result<bool>;
    fn remove(&self, name: &str) -> std::io::Result<()>;
}

/// Cleanup across a user-scope and a system-scope store.
pub struct ScopedEnvCleanup<U, S> {
    user: U,
    system: S,
    elevated: bool,
    var_names: Vec<String>,
}

impl<U: VarStore, S: VarStore> ScopedEnvCleanup<U, S> {
    pub fn new(user: U, system: S, elevated: bool, var_names: Vec<String>) -> Self {
        Self {
            user,
            system,
            elevated,
            var_names,
        }
    }

    fn present<'a>(&'a self, store: &dyn VarStore, scope: &str) -> Vec<&'a str> {
        self.var_names
            .iter()
            .map(String::as_str)
            .filter(|name| match store.contains(name) {
                Ok(found) => {
                    if found {
                        debug!("Found {} variable {}", scope, name);
                    }
                    found
                }
                Err(e) => {
                    warn!("Could not read {} variable {}: {}", scope, name, e);
                    false
                }
            })
            .collect()
    }
}

fn remove_all(store: &dyn VarStore, names: &[&str]) -> (usize, Vec<String>) {
    let mut removed = 0;
    let mut failures = Vec::new();

    for name in names {
        match store.remove(name) {
            Ok(()) => {
                debug!("Removed variable {}", name);
                removed += 1;
            }
            Err(e) => {
                warn!("Failed to remove variable {}: {}", name, e);
                failures.push(format!("{name}: {e}"));
            }
        }
    }

    (removed, failures)
}

impl<U: VarStore, S: VarStore> EnvCleanup for ScopedEnvCleanup<U, S> {
    fn remove_overrides(&self) -> HelperResult<CleanupOutcome> {
        let user_vars = self.present(&self.user, "user");
        let system_vars = self.present(&self.system, "system");

        if user_vars.is_empty() && system_vars.is_empty() {
            info!("No *_VM_OPTIONS variables found");
            return Ok(CleanupOutcome::default());
        }

        let mut removed = 0;
        let mut failures: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        if !user_vars.is_empty() {
            let (count, errors) = remove_all(&self.user, &user_vars);
            removed += count;
            failures.extend(errors.into_iter().map(|e| format!("user: {e}")));
            info!("Removed {} user-level variable(s)", count);
        }

        if !system_vars.is_empty() {
            if !self.elevated {
                warn!("System-level variables found without administrator rights");
                warnings.push(
                    "System-level *_VM_OPTIONS variables were found but the program is not \
                     running as Administrator. Re-run it elevated to remove them."
                        .to_string(),
                );
            } else {
                let (count, errors) = remove_all(&self.system, &system_vars);
                removed += count;
                if !errors.is_empty() {
                    warnings.push(format!(
                        "Failed to remove system-level variables: {}",
                        errors.join("; ")
                    ));
                }
                info!("Removed {} system-level variable(s)", count);
            }
        }

        if !failures.is_empty() && removed == 0 {
            return Err(HelperError::EnvCleanup(failures.join("; ")));
        }
        if !failures.is_empty() {
            warnings.push(format!(
                "Some user-level variables could not be removed: {}",
                failures.join("; ")
            ));
        }

        info!("Environment cleanup finished, {} variable(s) removed", removed);
        Ok(CleanupOutcome {
            removed,
            warning: (!warnings.is_empty()).then(|| warnings.join(" ")),
        })
    }
}

/// The cleanup implementation for the platform this binary was built for.
#[cfg(windows)]
pub fn platform_env_cleanup(var_names: Vec<String>) -> Box<dyn EnvCleanup + Send + Sync> {
    Box::new(windows::registry_cleanup(var_names))
}

#[cfg(not(windows))]
pub fn platform_env_cleanup(_var_names: Vec<String>) -> Box<dyn EnvCleanup + Send + Sync> {
    Box::new(NoopEnvCleanup)
}
