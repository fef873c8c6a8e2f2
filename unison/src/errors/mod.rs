//! Error types exposed by this crate.

use std::io;

use anyerror::AnyError;

/// Fatal is unrecoverable and shuts the coordinator down at once.
///
/// A fatal coordinator surfaces `running_state: Err(..)` through its metrics
/// channel and stops consuming views. The surrounding membership layer is
/// expected to treat this as a node failure and exclude the node from the
/// next view, forcing re-election.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum Fatal {
    /// The payload service failed to start or stop.
    #[error(transparent)]
    ServiceError(#[from] AnyError),

    #[error("panicked")]
    Panicked,

    /// The coordinator stopped normally.
    #[error("stopped normally")]
    Stopped,
}

impl From<io::Error> for Fatal {
    fn from(value: io::Error) -> Self {
        Fatal::ServiceError(AnyError::new(&value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("infallible")]
pub enum Infallible {}
