//! Eligibility filters: which projects receive which derived targets.

use nxv_core::{EnvironmentsConfig, PackagesConfig, ProjectDescriptor};

/// A project is an environment project when it already declares one of the
/// configured trigger targets and, if a tag filter is set, carries one of
/// those tags.
pub fn is_env_project(project: &ProjectDescriptor, options: &EnvironmentsConfig) -> bool {
    if options.target_names.is_empty() || !project.has_any_target(&options.target_names) {
        return false;
    }
    match &options.filter_by_tags {
        Some(tags) => project.has_any_tag(tags),
        None => true,
    }
}

/// Only libraries are published. Applications never qualify, whatever their tags.
pub fn is_pkg_project(project: &ProjectDescriptor, options: &PackagesConfig) -> bool {
    if !project.is_library() {
        return false;
    }
    match &options.filter_by_tags {
        Some(tags) => project.has_any_tag(tags),
        None => true,
    }
}
