//! Persisted registry state.
//!
//! The state file is the only channel between the invocation that started the
//! registry and the one that stops it. An absent or unparsable file means
//! "no registry running"; callers never see an error for that case.
//!
//! Writes use the `.tmp` + rename pattern so a reader never observes a
//! half-written file.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, RegistryError};

/// `{host, port, processId}` of one running registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentState {
    pub host: String,
    pub port: u16,
    pub process_id: u32,
}

impl EnvironmentState {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Load the state file. Returns `Ok(None)` when it is missing or unparsable.
pub fn load_state(path: &Path) -> Result<Option<EnvironmentState>, RegistryError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_err(path, err)),
    };
    match serde_json::from_str(&contents) {
        Ok(state) => Ok(Some(state)),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unparsable registry state");
            Ok(None)
        }
    }
}

/// Atomically write the state file, creating its directory if needed.
pub fn save_state(path: &Path, state: &EnvironmentState) -> Result<(), RegistryError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Remove the state file. Already gone is fine.
pub fn clear_state(path: &Path) -> Result<(), RegistryError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(path, err)),
    }
}
