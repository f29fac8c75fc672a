//! nxv core library: project/target descriptors, plugin options, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and descriptor structs shared with the host graph
//! - [`options`]: raw plugin options and their validated, normalized form
//! - [`workspace`]: read-only loading of project descriptors
//! - [`paths`]: the per-environment file layout
//! - [`error`]: [`ConfigError`]

pub mod error;
pub mod options;
pub mod paths;
pub mod types;
pub mod workspace;

pub use error::ConfigError;
pub use options::{
    load_options_at, EnvironmentsConfig, EnvironmentsOptions, NormalizedOptions, PackagesConfig,
    PackagesOptions, PluginOptions, DEFAULT_ENVIRONMENTS_DIR,
};
pub use types::{
    DependsOn, Params, ProjectDescriptor, ProjectKind, ProjectName, ProjectsSelector,
    TargetDescriptor, Targets,
};
pub use workspace::{load_workspace_at, Workspace};
