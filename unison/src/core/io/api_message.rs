use std::fmt;

use crate::membership::View;

/// A message sent by the application to the [`Core`].
///
/// [`Core`]: crate::core::core::Core
pub(crate) enum APIMessage {
    /// A new membership view agreed by the membership layer.
    ///
    /// A view whose version is not strictly greater than the last processed
    /// one is silently dropped.
    DeliverView { view: View },

    /// Ask the coordinator to quit; an active service instance is stopped
    /// best-effort on the way out.
    Shutdown,
}

impl fmt::Display for APIMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            APIMessage::DeliverView { view } => {
                write!(f, "DeliverView: {}", view)
            }
            APIMessage::Shutdown => {
                write!(f, "Shutdown")
            }
        }
    }
}
