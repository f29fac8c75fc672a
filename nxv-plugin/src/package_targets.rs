//! Package targets: install into and publish to the ephemeral registry.
//!
//! Both targets only declare edges; the host scheduler resolves them into a
//! topological order (publish after build and after every dependency is
//! published, install after publish and after every dependency is installed).

use nxv_core::{DependsOn, TargetDescriptor, Targets};

use crate::constants::{
    plugin_executor, EXECUTOR_PACKAGE_INSTALL, EXECUTOR_PACKAGE_PUBLISH, TARGET_BUILD,
    TARGET_PACKAGE_INSTALL, TARGET_PACKAGE_PUBLISH,
};

pub fn package_targets() -> Targets {
    Targets::from([
        (
            TARGET_PACKAGE_INSTALL.to_string(),
            TargetDescriptor::with_executor(plugin_executor(EXECUTOR_PACKAGE_INSTALL)).depends_on([
                DependsOn::on_self(TARGET_PACKAGE_PUBLISH).forward(),
                DependsOn::on_dependencies(TARGET_PACKAGE_INSTALL).forward(),
            ]),
        ),
        (
            TARGET_PACKAGE_PUBLISH.to_string(),
            TargetDescriptor::with_executor(plugin_executor(EXECUTOR_PACKAGE_PUBLISH)).depends_on([
                DependsOn::on_self(TARGET_BUILD).forward(),
                DependsOn::on_dependencies(TARGET_PACKAGE_PUBLISH).forward(),
            ]),
        ),
    ])
}
