//! # nxv-plugin
//!
//! Target synthesis: derives package and environment targets from a project's
//! static descriptor. Everything here is a pure transform except the port
//! allocator, which draws from a thread-local RNG.
//!
//! Call [`create_nodes`] for a whole workspace, or [`synthesize_project`] for
//! a single project with already-normalized options.

pub mod constants;
pub mod create_nodes;
pub mod eligibility;
pub mod env_targets;
pub mod package_targets;
pub mod port;
pub mod rewrite;

pub use create_nodes::{apply, create_nodes, synthesize_project, ProjectTargets};
pub use eligibility::{is_env_project, is_pkg_project};
pub use env_targets::{environment_targets, registry_targets};
pub use package_targets::package_targets;
pub use port::unique_port;
pub use rewrite::update_env_target_names;
