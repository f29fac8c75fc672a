//! Package executors: publish a built package to an environment's registry,
//! and install it into the environment root.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use nxv_core::paths;

use crate::error::{io_err, EnvError};
use crate::npm::{default_npm, Invocation};

/// The two `package.json` fields the executors need.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Build output containing the package's `package.json`.
    pub dist_dir: PathBuf,
    pub environment_root: PathBuf,
    /// Overrides the manifest version, e.g. for postfixed pre-release builds.
    pub pkg_version: Option<String>,
    pub npm: Vec<String>,
}

impl PackageOptions {
    pub fn new(dist_dir: impl Into<PathBuf>, environment_root: impl Into<PathBuf>) -> Self {
        Self {
            dist_dir: dist_dir.into(),
            environment_root: environment_root.into(),
            pkg_version: None,
            npm: default_npm(),
        }
    }
}

pub fn read_manifest(dist_dir: &Path) -> Result<PackageManifest, EnvError> {
    let path = paths::package_json_path(dist_dir);
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|source| EnvError::Manifest { path, source })
}

/// `npm install <name>@<version>` without lockfile churn, saved to the
/// environment's package.json, using only the environment's `.npmrc`.
pub fn install_invocation(
    manifest: &PackageManifest,
    options: &PackageOptions,
) -> Invocation {
    let version = options.pkg_version.as_deref().unwrap_or(&manifest.version);
    Invocation::new(
        &options.npm,
        [
            "install".to_string(),
            format!("{}@{}", manifest.name, version),
            "--no-fund".to_string(),
            "--no-shrinkwrap".to_string(),
            "--save".to_string(),
            format!("--userconfig={}", paths::NPMRC),
        ],
        &options.environment_root,
    )
}

/// `npm publish` from the dist directory against the environment's `.npmrc`.
pub fn publish_invocation(npmrc: &Path, options: &PackageOptions) -> Invocation {
    Invocation::new(
        &options.npm,
        [
            "publish".to_string(),
            format!("--userconfig={}", npmrc.display()),
        ],
        &options.dist_dir,
    )
}

pub async fn install_package(options: &PackageOptions) -> Result<PackageManifest, EnvError> {
    let manifest = read_manifest(&options.dist_dir)?;
    tracing::info!(
        package = %manifest.name,
        version = options.pkg_version.as_deref().unwrap_or(&manifest.version),
        root = %options.environment_root.display(),
        "installing package"
    );
    install_invocation(&manifest, options).run().await?;
    Ok(manifest)
}

pub async fn publish_package(options: &PackageOptions) -> Result<PackageManifest, EnvError> {
    let manifest = read_manifest(&options.dist_dir)?;
    let npmrc = absolute(&paths::npmrc_path(&options.environment_root))?;
    tracing::info!(
        package = %manifest.name,
        version = %manifest.version,
        npmrc = %npmrc.display(),
        "publishing package"
    );
    publish_invocation(&npmrc, options).run().await?;
    Ok(manifest)
}

/// Publish runs from the dist directory, so the config path must not be relative.
fn absolute(path: &Path) -> Result<PathBuf, EnvError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| io_err(".", e))?;
    Ok(cwd.join(path))
}
