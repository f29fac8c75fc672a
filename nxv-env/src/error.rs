//! Error types for nxv-env.

use std::path::PathBuf;

use thiserror::Error;

use nxv_registry::RegistryError;

/// All errors that can arise while preparing or using an environment.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Registry start/stop failure, including startup and teardown errors.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package manifest at {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A child command ran and reported failure.
    #[error("`{command}` failed with {status}{}", format_stderr(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("empty command line")]
    EmptyCommand,
}

/// Convenience constructor for [`EnvError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> EnvError {
    EnvError::Io {
        path: path.into(),
        source,
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
