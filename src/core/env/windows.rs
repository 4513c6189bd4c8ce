use std::io::ErrorKind;

use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE};
use winreg::RegKey;

use super::{ScopedEnvCleanup, VarStore};

const USER_ENV_KEY: &str = "Environment";
const SYSTEM_ENV_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

#[derive(Debug, Clone, Copy)]
pub enum RegistryScope {
    User,
    System,
}

/// Persistent environment variables of one registry hive.
#[derive(Debug, Clone, Copy)]
pub struct RegistryStore {
    scope: RegistryScope,
}

impl RegistryStore {
    pub fn new(scope: RegistryScope) -> Self {
        Self { scope }
    }

    fn open(&self, flags: u32) -> std::io::Result<RegKey> {
        match self.scope {
            RegistryScope::User => {
                RegKey::predef(HKEY_CURRENT_USER).open_subkey_with_flags(USER_ENV_KEY, flags)
            }
            RegistryScope::System => {
                RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey_with_flags(SYSTEM_ENV_KEY, flags)
            }
        }
    }
}

impl VarStore for RegistryStore {
    fn contains(&self, name: &str) -> std::io::Result<bool> {
        let key = match self.open(KEY_QUERY_VALUE) {
            Ok(key) => key,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        match key.get_raw_value(name) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn remove(&self, name: &str) -> std::io::Result<()> {
        self.open(KEY_SET_VALUE)?.delete_value(name)
    }
}

/// Write access to the machine environment key is what removal needs, so
/// that is what counts as elevated here.
pub fn is_elevated() -> bool {
    RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey_with_flags(SYSTEM_ENV_KEY, KEY_SET_VALUE)
        .is_ok()
}

pub fn registry_cleanup(var_names: Vec<String>) -> ScopedEnvCleanup<RegistryStore, RegistryStore> {
    ScopedEnvCleanup::new(
        RegistryStore::new(RegistryScope::User),
        RegistryStore::new(RegistryScope::System),
        is_elevated(),
        var_names,
    )
}
