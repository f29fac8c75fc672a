//! # nxv-env
//!
//! Environment executors: bootstrap an isolated environment root against its
//! own registry, publish/install packages into it, and run the full setup
//! sequence with guaranteed registry teardown.

pub mod bootstrap;
pub mod error;
pub mod npm;
pub mod package;
pub mod setup;

pub use bootstrap::{bootstrap_environment, BootstrapOptions, BootstrapResult};
pub use error::EnvError;
pub use npm::Invocation;
pub use package::{install_package, publish_package, PackageManifest, PackageOptions};
pub use setup::{setup_environment, SetupOptions, SetupReport};
