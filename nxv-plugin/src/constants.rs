//! Target names and executor references emitted into the host graph.

pub const PLUGIN_NAME: &str = "@push-based/nx-verdaccio";

pub const TARGET_PACKAGE_INSTALL: &str = "nxv-pkg-install";
pub const TARGET_PACKAGE_PUBLISH: &str = "nxv-pkg-publish";

pub const TARGET_ENVIRONMENT_BOOTSTRAP: &str = "nxv-env-bootstrap";
pub const TARGET_ENVIRONMENT_INSTALL: &str = "nxv-env-install";
pub const TARGET_ENVIRONMENT_SETUP: &str = "nxv-env-setup";
pub const TARGET_ENVIRONMENT_VERDACCIO_START: &str = "nxv-env-verdaccio-start";
pub const TARGET_ENVIRONMENT_VERDACCIO_STOP: &str = "nxv-env-verdaccio-stop";

/// The build target every publish waits on.
pub const TARGET_BUILD: &str = "build";

pub const EXECUTOR_PACKAGE_INSTALL: &str = "pkg-install";
pub const EXECUTOR_PACKAGE_PUBLISH: &str = "pkg-publish";
pub const EXECUTOR_ENVIRONMENT_BOOTSTRAP: &str = "env-bootstrap";
pub const EXECUTOR_ENVIRONMENT_SETUP: &str = "env-setup";
pub const EXECUTOR_KILL_PROCESS: &str = "kill-process";

/// Host-provided registry server executor.
pub const EXECUTOR_REGISTRY_SERVER: &str = "@nx/js:verdaccio";
/// Host-provided executor that does nothing but run its dependencies.
pub const EXECUTOR_NOOP: &str = "nx:noop";

/// `<plugin>:<executor>` reference for one of this plugin's executors.
pub fn plugin_executor(executor: &str) -> String {
    format!("{PLUGIN_NAME}:{executor}")
}
