use std::sync::Arc;

use anyerror::AnyError;
use tokio::sync::mpsc;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing::Instrument;
use tracing::Level;
use tracing::Span;

use crate::base::display_ext::DisplayOptionExt;
use crate::config::Config;
use crate::core::io::api_message::APIMessage;
use crate::core::io::notification::Notification;
use crate::elect::Preference;
use crate::errors::Fatal;
use crate::errors::Infallible;
use crate::membership::NodeId;
use crate::membership::View;
use crate::metrics::Metrics;
use crate::metrics::NodeState;
use crate::service::Service;

/// The core type implementing the per-node singleton coordinator.
///
/// It is a single task consuming two channels, so view handling on one node
/// is strictly serialized: views are processed one at a time, in version
/// order, never concurrently. Across nodes there is no coordination at all;
/// correctness rests on the election policy being a pure function of the
/// view data every node eventually receives.
pub(crate) struct Core<S>
where S: Service
{
    /// This node's ID.
    pub(crate) id: NodeId,

    /// This node's runtime config.
    pub(crate) config: Arc<Config>,

    /// The preference rule applied to every accepted view.
    pub(crate) preference: Preference,

    /// The payload [`Service`] implementation.
    pub(crate) service: S,

    /// Whether the local service instance is running.
    ///
    /// Owned exclusively by this task; other components observe it through
    /// the metrics channel only.
    pub(crate) state: NodeState,

    /// The last accepted view.
    ///
    /// Replaced wholesale on every accepted delivery; versions strictly
    /// increase.
    pub(crate) view: Option<View>,

    /// The member elected for the last accepted view.
    pub(crate) elected: Option<NodeId>,

    /// Start attempts made for the current view.
    pub(crate) start_attempts: u64,

    pub(crate) rx_api: mpsc::UnboundedReceiver<APIMessage>,

    /// A Sender for other components to call back into [`Core`], e.g. when a
    /// scheduled start retry comes due.
    pub(crate) tx_notification: mpsc::UnboundedSender<Notification>,

    /// A Receiver to receive callback from other components.
    pub(crate) rx_notification: mpsc::UnboundedReceiver<Notification>,

    pub(crate) tx_metrics: watch::Sender<Metrics>,

    pub(crate) span: Span,
}

impl<S> Core<S>
where S: Service
{
    /// The main loop of the coordinator.
    pub(crate) async fn main(mut self) -> Result<Infallible, Fatal> {
        debug!("Unison node started");

        // Initialize metrics
        self.report_metrics();

        let span = tracing::span!(parent: &self.span, Level::DEBUG, "main");
        let res = self.runtime_loop().instrument(span).await;

        // Safe unwrap: res is Result<Infallible, _>
        let err = res.unwrap_err();
        match err {
            Fatal::Stopped => { /* Normal quit */ }
            _ => {
                error!(error = display(&err), "quit Core::main on error");
            }
        }

        // Do not leave a payload instance running behind a quitting
        // coordinator.
        if self.state == NodeState::Active {
            info!("id={} stopping active service instance on quit", self.id);
            match self.service.stop().await {
                Ok(()) => {
                    self.state = NodeState::Inactive;
                }
                Err(stop_err) => {
                    warn!(
                        "id={} failed to stop service on quit: {}",
                        self.id, stop_err
                    );
                }
            }
        }

        debug!("update the metrics for shutdown");
        {
            let mut curr = self.tx_metrics.borrow().clone();
            curr.running_state = Err(err.clone());
            curr.state = self.state;

            let _ = self.tx_metrics.send(curr);
        }

        info!("Core shutdown complete");

        Err(err)
    }

    /// Report a metrics payload on the current state of the node.
    pub(crate) fn report_metrics(&mut self) {
        let members = self
            .view
            .as_ref()
            .map(|v| v.node_ids().cloned().collect())
            .unwrap_or_default();

        let m = Metrics {
            running_state: Ok(()),
            id: self.id.clone(),

            state: self.state,
            elected: self.elected.clone(),
            view_version: self.view.as_ref().map(|v| v.version()),
            members,
        };

        debug!("id={} report_metrics: {}", self.id, m);
        let res = self.tx_metrics.send(m);

        if let Err(err) = res {
            error!(error=%err, id=display(&self.id), "error reporting metrics");
        }
    }

    /// Run an event handling loop
    ///
    /// It always returns a [`Fatal`] error upon returning.
    #[tracing::instrument(level = "debug", skip_all, fields(id=display(&self.id)))]
    async fn runtime_loop(&mut self) -> Result<Infallible, Fatal> {
        loop {
            self.report_metrics();

            debug!("id={} runtime_loop: wait for next event", self.id);

            // Internal notifications are drained before new view deliveries,
            // so a due retry is never starved by a busy membership layer.
            tokio::select! {
                biased;

                notify_res = self.rx_notification.recv() => {
                    match notify_res {
                        Some(notify) => self.handle_notification(notify).await?,
                        None => {
                            error!("all rx_notification senders are dropped");
                            return Err(Fatal::Stopped);
                        }
                    };
                }

                msg_res = self.rx_api.recv() => {
                    match msg_res {
                        Some(msg) => self.handle_api_msg(msg).await?,
                        None => {
                            info!("all rx_api senders are dropped");
                            return Err(Fatal::Stopped);
                        }
                    };
                }
            }
        }
    }

    #[tracing::instrument(level = "debug", skip(self, msg), fields(id=display(&self.id)))]
    pub(crate) async fn handle_api_msg(
        &mut self,
        msg: APIMessage,
    ) -> Result<(), Fatal> {
        debug!("VIEW_event id={:<2}  input: {}", self.id, msg);

        match msg {
            APIMessage::DeliverView { view } => {
                self.apply_view(view).await?;
            }
            APIMessage::Shutdown => {
                info!("received APIMessage::Shutdown: {}", func_name!());
                return Err(Fatal::Stopped);
            }
        };

        Ok(())
    }

    pub(crate) async fn handle_notification(
        &mut self,
        notify: Notification,
    ) -> Result<(), Fatal> {
        debug!("VIEW_event id={:<2} notify: {}", self.id, notify);

        match notify {
            Notification::StartRetry { version, attempt } => {
                let current = self.view.as_ref().map(|v| v.version());

                if current != Some(version) {
                    debug!(
                        "id={} discard superseded StartRetry for v{}, current view version: {:?}",
                        self.id, version, current
                    );
                    return Ok(());
                }

                info!(
                    "id={} service start retry due, attempt {}",
                    self.id, attempt
                );
                self.apply_election().await?;
            }
        };
        Ok(())
    }

    /// Accept a newly delivered view and enact the election it implies.
    ///
    /// A view that is not strictly newer than the last accepted one is a
    /// no-op: stale and duplicate deliveries are expected under transport
    /// retries and must not move this node backwards.
    async fn apply_view(&mut self, view: View) -> Result<(), Fatal> {
        if let Some(current) = &self.view {
            if view.version() <= current.version() {
                debug!(
                    "id={} ignore stale view {}: current is {}",
                    self.id, view, current
                );
                return Ok(());
            }
        }

        let elected = self.preference.elect(&view);

        info!(
            "id={} accepted view {}, elected: {}: {}",
            self.id,
            view,
            elected.display(),
            func_name!()
        );

        self.elected = elected;
        self.view = Some(view);
        self.start_attempts = 0;

        self.apply_election().await
    }

    /// Converge the local state onto the current election result.
    ///
    /// Idempotent: re-running it for an unchanged verdict does nothing.
    async fn apply_election(&mut self) -> Result<(), Fatal> {
        let is_local = self.elected.as_ref() == Some(&self.id);

        match (is_local, self.state) {
            (true, NodeState::Inactive) => self.activate().await,
            (false, NodeState::Active) => self.deactivate().await,
            _ => Ok(()),
        }
    }

    /// Start the local service instance and claim the singleton.
    ///
    /// `Active` is claimed only after a successful start. A failed attempt
    /// schedules a jittered retry bound to the current view version; once
    /// the configured attempts are exhausted the failure is fatal, so that
    /// the membership layer can exclude this node and the next view can
    /// elect another member.
    async fn activate(&mut self) -> Result<(), Fatal> {
        self.start_attempts += 1;

        let res = self.service.start().await;

        match res {
            Ok(()) => {
                self.state = NodeState::Active;
                info!("id={} service instance started, now Active", self.id);
                Ok(())
            }
            Err(err) => {
                warn!(
                    "id={} service start failed (attempt {}/{}): {}",
                    self.id, self.start_attempts, self.config.start_retries, err
                );

                if self.start_attempts >= self.config.start_retries {
                    error!(
                        "id={} exhausted start attempts, giving up",
                        self.id
                    );
                    return Err(Fatal::ServiceError(AnyError::new(&err)));
                }

                self.schedule_start_retry();
                Ok(())
            }
        }
    }

    fn schedule_start_retry(&mut self) {
        // Safe unwrap(): activation is only attempted with a view in place.
        let version = self.view.as_ref().unwrap().version();
        let attempt = self.start_attempts;
        let delay = self.config.new_rand_retry_interval();
        let tx = self.tx_notification.clone();

        debug!(
            "id={} schedule StartRetry for v{} in {:?}",
            self.id, version, delay
        );

        let fu = async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Notification::StartRetry { version, attempt });
        };

        // False positive lint warning(`non-binding `let` on a future`): https://github.com/rust-lang/rust-clippy/issues/9932
        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(fu);
    }

    /// Stop the local service instance and cede the singleton.
    async fn deactivate(&mut self) -> Result<(), Fatal> {
        let res = self.service.stop().await;

        match res {
            Ok(()) => {
                self.state = NodeState::Inactive;
                info!("id={} service instance stopped, now Inactive", self.id);
                Ok(())
            }
            Err(err) => {
                // A node that cannot stop its instance must not keep running
                // with an unknown payload state; quit and let the membership
                // layer exclude it.
                error!("id={} service stop failed: {}", self.id, err);
                Err(Fatal::ServiceError(AnyError::new(&err)))
            }
        }
    }
}
