use std::path::PathBuf;

use thiserror::Error;

/// Error surface for registry start/stop and state persistence.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server exited, never reported readiness, or could not be spawned.
    #[error("registry for '{project}' failed to start: {reason}{}", format_log_tail(.log_tail))]
    Startup {
        project: String,
        reason: String,
        log_tail: Vec<String>,
    },

    /// The recorded process is alive but would not terminate.
    #[error("failed to terminate registry process {pid}: {reason}")]
    Teardown { pid: u32, reason: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.into(),
        source,
    }
}

fn format_log_tail(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    format!("\n--- registry output ---\n{}", lines.join("\n"))
}
