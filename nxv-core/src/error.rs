//! Error types for nxv-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or validating configuration and project descriptors.
///
/// Any of these aborts a synthesis pass before a single target is emitted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML/JSON parse error on load: includes file path and serde_yaml's line context.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required option resolved to nothing usable.
    #[error("missing required option `{field}`")]
    MissingField { field: &'static str },

    /// An option was present but malformed.
    #[error("invalid option `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// Two project descriptors share one name.
    #[error("duplicate project '{name}' in workspace")]
    DuplicateProject { name: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
