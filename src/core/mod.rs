// ─── IDE Config Helper Core ───
// Backend for injecting and removing the helper's JVM flags in JetBrains
// `.vmoptions` files.
//
// Architecture:
//   core/
//     install/   : Path sanitizing, IDE bin resolution, options file listing
//     permission : Read/write pre-flight probes with elevation hints
//     patch/     : Owned flag lines + whole-file apply/clear
//     env/       : *_VM_OPTIONS cleanup (registry on Windows, no-op elsewhere)
//     update/    : Release lookup over API mirrors, version comparison
//     state/     : Startup-built configuration and persisted settings

pub mod env;
pub mod error;
pub mod http;
pub mod install;
pub mod patch;
pub mod permission;
pub mod state;
pub mod update;
