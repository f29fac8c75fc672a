//! Per-environment file layout.
//!
//! Everything mutable lives under one environment root so parallel
//! environments never touch each other's files.

use std::path::{Path, PathBuf};

/// Persisted `{host, port, processId}` of the running registry.
pub const STATE_FILE: &str = "verdaccio-registry.json";
/// Combined stdout/stderr of the registry process.
pub const REGISTRY_LOG: &str = "verdaccio.log";
pub const STORAGE_DIR: &str = "storage";

pub const NODE_MODULES: &str = "node_modules";
pub const PACKAGE_JSON: &str = "package.json";
pub const NPMRC: &str = ".npmrc";
pub const LOCKFILE: &str = "package-lock.json";

/// Registry config shipped with the workspace, relative to the workspace root.
pub const REGISTRY_CONFIG: &str = ".verdaccio/config.yml";

pub fn state_file_path(environment_root: &Path) -> PathBuf {
    environment_root.join(STATE_FILE)
}

pub fn registry_log_path(environment_root: &Path) -> PathBuf {
    environment_root.join(REGISTRY_LOG)
}

pub fn storage_dir(environment_root: &Path) -> PathBuf {
    environment_root.join(STORAGE_DIR)
}

pub fn npmrc_path(environment_root: &Path) -> PathBuf {
    environment_root.join(NPMRC)
}

pub fn package_json_path(dir: &Path) -> PathBuf {
    dir.join(PACKAGE_JSON)
}
