//! The boundary between the coordinator and the payload service.

use std::io;

use async_trait::async_trait;

/// The payload service whose single active instance the cluster maintains.
///
/// `start` and `stop` are invoked exclusively by the local coordinator, at
/// most once per activation or deactivation attempt, and their result is
/// observed before the coordinator transitions its state. The coordinator
/// never claims to be active while `start` has not reported success.
///
/// An implementation must report failure honestly instead of pretending to
/// run: a failed start is retried a bounded number of times and then
/// escalated to a fatal node error, which lets the membership layer exclude
/// the node and re-elect elsewhere.
#[async_trait]
pub trait Service: Send + 'static {
    /// Bring the local service instance up.
    async fn start(&mut self) -> Result<(), io::Error>;

    /// Tear the local service instance down.
    async fn stop(&mut self) -> Result<(), io::Error>;
}
