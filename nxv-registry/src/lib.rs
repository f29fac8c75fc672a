//! Ephemeral registry lifecycle: start a detached registry server, persist its
//! `{host, port, processId}`, and stop it again from a separate invocation.

mod error;
pub mod process;
pub mod readiness;
pub mod state;
mod supervisor;

pub use error::RegistryError;
pub use readiness::{parse_registry_line, RegistryAddress};
pub use state::{clear_state, load_state, save_state, EnvironmentState};
pub use supervisor::{
    start_registry, start_registry_blocking, stop_registry, RegistryServerOptions, StopOutcome,
    DEFAULT_READY_TIMEOUT, DEFAULT_STOP_GRACE,
};
