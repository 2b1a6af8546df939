//! Error and diagnostic types.
//!
//! The state machine itself never fails: unexpected input is recorded as an
//! [`IllegalTransition`] and otherwise ignored. Real errors only come from the
//! ambient layers (configuration loading, the tokio driver).

use thiserror::Error;

use crate::sd::client_behavior::BehaviorState;
use crate::sd::events::EventKind;

/// An event that matched no transition of the state it was delivered in.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal event {event} in state {state}")]
pub struct IllegalTransition {
    pub state: BehaviorState,
    pub event: EventKind,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeError {
    /// The machine's task has terminated and no longer accepts input.
    #[error("client behavior runtime is closed")]
    Closed,
}
