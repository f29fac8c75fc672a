//! Environment targets: bootstrap, install indirection, setup, and the
//! registry start/stop pair.

use std::path::Path;

use nxv_core::{paths, DependsOn, EnvironmentsConfig, ProjectDescriptor, TargetDescriptor, Targets};

use crate::constants::{
    plugin_executor, EXECUTOR_ENVIRONMENT_BOOTSTRAP, EXECUTOR_ENVIRONMENT_SETUP,
    EXECUTOR_KILL_PROCESS, EXECUTOR_NOOP, EXECUTOR_REGISTRY_SERVER, TARGET_ENVIRONMENT_BOOTSTRAP,
    TARGET_ENVIRONMENT_INSTALL, TARGET_ENVIRONMENT_SETUP, TARGET_ENVIRONMENT_VERDACCIO_START,
    TARGET_ENVIRONMENT_VERDACCIO_STOP, TARGET_PACKAGE_INSTALL,
};

/// Outputs of the setup target, relative to its `environmentRoot` option.
pub const SETUP_OUTPUTS: [&str; 4] = [
    paths::NODE_MODULES,
    paths::PACKAGE_JSON,
    paths::NPMRC,
    paths::LOCKFILE,
];

pub fn environment_targets(project: &ProjectDescriptor, options: &EnvironmentsConfig) -> Targets {
    let environment_root = path_value(&options.environment_root(&project.name.0));

    let bootstrap = TargetDescriptor::with_executor(plugin_executor(EXECUTOR_ENVIRONMENT_BOOTSTRAP))
        .option("environmentRoot", environment_root.clone());

    // Runs the dependency pkg-install targets with this environment's root forwarded.
    let install = TargetDescriptor::with_executor(EXECUTOR_NOOP)
        .option("environmentRoot", environment_root.clone())
        .depends_on([DependsOn::on_dependencies(TARGET_PACKAGE_INSTALL).forward()]);

    // Ephemeral registries make cache keys unsound.
    let setup = TargetDescriptor {
        outputs: Some(
            SETUP_OUTPUTS
                .iter()
                .map(|f| format!("{{options.environmentRoot}}/{f}"))
                .collect(),
        ),
        cache: Some(false),
        ..TargetDescriptor::with_executor(plugin_executor(EXECUTOR_ENVIRONMENT_SETUP))
    }
    .option("environmentRoot", environment_root);

    Targets::from([
        (TARGET_ENVIRONMENT_BOOTSTRAP.to_string(), bootstrap),
        (TARGET_ENVIRONMENT_INSTALL.to_string(), install),
        (TARGET_ENVIRONMENT_SETUP.to_string(), setup),
    ])
}

/// Registry start/stop targets. `port` comes from the caller so synthesis
/// stays deterministic under test.
pub fn registry_targets(
    project: &ProjectDescriptor,
    options: &EnvironmentsConfig,
    port: u16,
) -> Targets {
    let environment_root = options.environment_root(&project.name.0);

    let start = TargetDescriptor::with_executor(EXECUTOR_REGISTRY_SERVER)
        .option("config", paths::REGISTRY_CONFIG)
        .option("port", port)
        .option("storage", path_value(&paths::storage_dir(&environment_root)))
        .option("clear", true)
        .option("environmentDir", path_value(&environment_root))
        .option("projectName", project.name.0.clone());

    let stop = TargetDescriptor::with_executor(plugin_executor(EXECUTOR_KILL_PROCESS)).option(
        "filePath",
        path_value(&paths::state_file_path(&environment_root)),
    );

    Targets::from([
        (TARGET_ENVIRONMENT_VERDACCIO_START.to_string(), start),
        (TARGET_ENVIRONMENT_VERDACCIO_STOP.to_string(), stop),
    ])
}

/// Host graphs expect forward slashes regardless of platform.
fn path_value(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
