use std::fmt;

/// A message coming from the internal components.
pub(crate) enum Notification {
    /// A scheduled retry of a failed service start has come due.
    ///
    /// `version` is the view version the failed attempt was made for. A
    /// retry that arrives after a newer view has been accepted is stale and
    /// is discarded: the newer view has already re-run the election and, if
    /// this node is still the one elected, made a fresh start attempt.
    StartRetry { version: u64, attempt: u64 },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartRetry { version, attempt } => {
                write!(f, "StartRetry: view v{}, attempt {}", version, attempt)
            }
        }
    }
}
