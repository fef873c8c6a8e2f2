//! Public interface and data types.
//!
//! [`Unison`] serves as the primary interface to a Unison node,
//! facilitating all interactions with the underlying Core.
//!
//! While `Core` operates as a singleton within an application, [`Unison`]
//! instances are designed to be cheaply cloneable.
//! This allows multiple components within the application that require
//! interaction with `Core` to efficiently share access.

mod inner;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::trace_span;
use tracing::Instrument;
use tracing::Level;

use crate::config::Config;
use crate::core::core::Core;
use crate::core::core_state::CoreState;
use crate::core::io::api_message::APIMessage;
use crate::elect::Preference;
use crate::errors::Fatal;
use crate::membership::NodeId;
use crate::membership::View;
use crate::metrics::Metrics;
use crate::metrics::NodeState;
use crate::metrics::Wait;
use crate::service::Service;
use crate::unison::inner::UnisonInner;

/// The Unison API.
///
/// A `Unison` handle drives one node's share of a clustered singleton: the
/// membership layer feeds it views, and the node starts or stops its local
/// service instance as the election over each view dictates.
///
/// ### Clone
///
/// This type implements `Clone`, and cloning itself is very cheap and helps
/// to facilitate use with async workflows.
///
/// ### Shutting down
///
/// If any of the interfaces returns a [`Fatal`], this indicates that the
/// Unison node is shutting down. If the parent application needs to shutdown
/// the Unison node for any reason, calling `shutdown` will do the trick.
#[derive(Clone)]
pub struct Unison {
    inner: Arc<UnisonInner>,
}

impl Unison {
    /// Create and spawn a new Unison coordinator task.
    ///
    /// ### `id`
    /// The ID which the spawned task will use to identify itself within the
    /// cluster. Applications must guarantee that the ID provided to this
    /// function is stable across restarts of the node.
    ///
    /// ### `config`
    /// Unison's runtime config. See the docs on the `Config` object for more
    /// details. The election preference is taken from `config.preferred`.
    ///
    /// ### `service`
    /// An implementation of the [`Service`] trait wrapping the payload this
    /// cluster runs as a singleton.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn new<S>(id: NodeId, config: Arc<Config>, service: S) -> Self
    where S: Service {
        let (tx_api, rx_api) = mpsc::unbounded_channel();
        let (tx_notify, rx_notify) = mpsc::unbounded_channel();
        let (tx_metrics, rx_metrics) =
            watch::channel(Metrics::new_initial(id.clone()));

        let preference = Preference::new(config.preferred.clone());

        let core_span = tracing::span!(
            parent: tracing::Span::current(),
            Level::DEBUG,
            "Core",
            id = display(&id),
        );

        let core: Core<S> = Core {
            id: id.clone(),
            config: config.clone(),
            preference,
            service,

            state: NodeState::Inactive,
            view: None,
            elected: None,
            start_attempts: 0,

            rx_api,

            tx_notification: tx_notify,
            rx_notification: rx_notify,

            tx_metrics,

            span: core_span,
        };

        let core_handle = tokio::spawn(
            core.main().instrument(trace_span!("spawn").or_current()),
        );

        let inner = UnisonInner {
            id,
            config,
            tx_api,
            rx_metrics,
            core_state: std::sync::Mutex::new(CoreState::Running(core_handle)),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Return the config of this Unison node.
    pub fn config(&self) -> &Arc<Config> {
        &self.inner.config
    }

    /// Return the ID of this Unison node.
    pub fn id(&self) -> &NodeId {
        &self.inner.id
    }

    /// Deliver a new membership view to this node and return at once.
    ///
    /// The view is enacted asynchronously by the coordinator task. A view
    /// whose version is not greater than the last accepted one is discarded.
    ///
    /// Returns error when Core has [`Fatal`] error, e.g. shut down or having
    /// failed its service instance for good.
    pub async fn deliver_view(&self, view: View) -> Result<(), Fatal> {
        let msg = APIMessage::DeliverView { view };
        self.inner.send_msg(msg).await?;
        Ok(())
    }

    /// Get the member currently elected, from this node's point of view.
    ///
    /// This method is based on the metrics system which does a good job at
    /// staying up-to-date. It reflects the last view this node accepted,
    /// which may trail the newest view during a membership change.
    pub async fn elected(&self) -> Option<NodeId> {
        let m = self.metrics();
        let mm = m.borrow();
        mm.elected.clone()
    }

    /// Return `true` if this node currently runs the active service instance.
    pub async fn is_active(&self) -> bool {
        let m = self.metrics();
        let mm = m.borrow();
        mm.state == NodeState::Active
    }

    /// Shut this node down gracefully.
    ///
    /// An active service instance is stopped before the coordinator task
    /// quits. Returns the error that stopped the Core, if it was not a plain
    /// shutdown.
    pub async fn shutdown(&self) -> Result<(), Fatal> {
        // Core may have quit already; join either way.
        let _ = self.inner.send_msg(APIMessage::Shutdown).await;

        let fatal = self
            .inner
            .get_core_stopped_error("awaiting shutdown", None::<&'static str>)
            .await;

        match fatal {
            Fatal::Stopped => Ok(()),
            err => Err(err),
        }
    }

    /// Get a handle to the metrics channel.
    pub fn metrics(&self) -> watch::Receiver<Metrics> {
        self.inner.rx_metrics.clone()
    }

    /// Get a handle to wait for the metrics to satisfy some condition.
    ///
    /// If `timeout` is `None`, then it will wait forever(10 years).
    /// If `timeout` is `Some`, then it will wait for the specified duration.
    ///
    /// ```ignore
    /// # use std::time::Duration;
    /// # use unison::Unison;
    ///
    /// let timeout = Duration::from_millis(200);
    ///
    /// // wait for this node to see view version 3:
    /// u.wait(Some(timeout)).view_version(3, "view").await?;
    ///
    /// // wait for ever for the election to settle on node b:
    /// u.wait(None).elected(Some(nid("b")), "elected").await?;
    /// ```
    pub fn wait(&self, timeout: Option<Duration>) -> Wait {
        let timeout = match timeout {
            Some(t) => t,
            None => Duration::from_secs(86400 * 365 * 100),
        };
        Wait {
            timeout,
            rx: self.inner.rx_metrics.clone(),
        }
    }
}
