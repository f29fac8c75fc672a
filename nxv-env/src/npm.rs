//! Package-manager plumbing: child command invocations and the registry
//! configuration written into an environment root.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde_json::json;
use tokio::process::Command;

use nxv_core::paths;
use nxv_registry::EnvironmentState;

use crate::error::{io_err, EnvError};

/// Token the ephemeral registry accepts for publishes.
pub const REGISTRY_AUTH_TOKEN: &str = "secretVerdaccioToken";

/// Default package-manager command line.
pub fn default_npm() -> Vec<String> {
    vec!["npm".to_string()]
}

/// One child command: a program prefix (e.g. `npm` or `npx nx`) plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(prefix: &[String], args: impl IntoIterator<Item = String>, cwd: &Path) -> Self {
        Self {
            argv: prefix.iter().cloned().chain(args).collect(),
            cwd: cwd.to_path_buf(),
        }
    }

    /// Run to completion. Output is captured and logged at debug level; a
    /// non-zero exit becomes [`EnvError::CommandFailed`] carrying stderr.
    pub async fn run(&self) -> Result<(), EnvError> {
        let (program, args) = self.argv.split_first().ok_or(EnvError::EmptyCommand)?;
        tracing::info!(command = %self, cwd = %self.cwd.display(), "running");

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| EnvError::Spawn {
                command: self.to_string(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!(target: "nxv_env::child", "{line}");
        }
        if !output.status.success() {
            return Err(EnvError::CommandFailed {
                command: self.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// `.npmrc` contents pointing the environment at `state`'s registry.
pub fn npmrc_contents(state: &EnvironmentState) -> String {
    format!(
        "registry={url}/\n//{host}:{port}/:_authToken={token}\n",
        url = state.url(),
        host = state.host,
        port = state.port,
        token = REGISTRY_AUTH_TOKEN,
    )
}

/// Write the environment-local `.npmrc`. Replaces any previous registry config.
pub fn configure_registry(
    environment_root: &Path,
    state: &EnvironmentState,
) -> Result<PathBuf, EnvError> {
    let path = paths::npmrc_path(environment_root);
    std::fs::write(&path, npmrc_contents(state)).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

/// Create a minimal private `package.json` so installs have somewhere to save.
/// An existing one is left alone.
pub fn ensure_package_json(environment_root: &Path, name: &str) -> Result<(), EnvError> {
    let path = paths::package_json_path(environment_root);
    if path.exists() {
        return Ok(());
    }
    let manifest = json!({
        "name": name,
        "version": "0.0.0",
        "private": true,
        "dependencies": {}
    });
    let body = serde_json::to_string_pretty(&manifest).map_err(|source| EnvError::Manifest {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, body).map_err(|e| io_err(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state() -> EnvironmentState {
        EnvironmentState {
            host: "localhost".into(),
            port: 4873,
            process_id: 1,
        }
    }

    #[test]
    fn npmrc_points_registry_and_token_at_bound_address() {
        assert_eq!(
            npmrc_contents(&state()),
            "registry=http://localhost:4873/\n//localhost:4873/:_authToken=secretVerdaccioToken\n"
        );
    }

    #[test]
    fn configure_overwrites_previous_registry() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".npmrc"), "registry=https://registry.npmjs.org/\n").unwrap();
        let path = configure_registry(tmp.path(), &state()).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(!contents.contains("npmjs.org"));
        assert!(contents.starts_with("registry=http://localhost:4873/"));
    }

    #[test]
    fn ensure_package_json_keeps_existing_file() {
        let tmp = TempDir::new().unwrap();
        ensure_package_json(tmp.path(), "lib-a-e2e").unwrap();
        let first: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(tmp.path().join("package.json")).unwrap())
                .unwrap();
        assert_eq!(first["name"], "lib-a-e2e");
        assert_eq!(first["private"], true);

        std::fs::write(tmp.path().join("package.json"), r#"{"name":"custom"}"#).unwrap();
        ensure_package_json(tmp.path(), "lib-a-e2e").unwrap();
        let kept = std::fs::read_to_string(tmp.path().join("package.json")).unwrap();
        assert_eq!(kept, r#"{"name":"custom"}"#);
    }

    #[test]
    fn invocation_displays_full_command_line() {
        let inv = Invocation::new(
            &["npx".to_string(), "nx".to_string()],
            ["run".to_string(), "lib-a-e2e:nxv-env-install".to_string()],
            Path::new("."),
        );
        assert_eq!(inv.to_string(), "npx nx run lib-a-e2e:nxv-env-install");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_status_and_stderr() {
        let inv = Invocation::new(
            &["sh".to_string(), "-c".to_string()],
            ["echo 'E404 not found' >&2; exit 3".to_string()],
            Path::new("."),
        );
        let err = inv.run().await.unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, EnvError::CommandFailed { .. }), "got: {msg}");
        assert!(msg.contains("E404"), "got: {msg}");
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let inv = Invocation::new(&[], Vec::new(), Path::new("."));
        assert!(matches!(inv.run().await, Err(EnvError::EmptyCommand)));
    }
}
