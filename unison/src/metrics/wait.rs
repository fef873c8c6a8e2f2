use core::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::membership::NodeId;
use crate::metrics::Condition;
use crate::metrics::Metric;
use crate::metrics::Metrics;
use crate::metrics::NodeState;

// Error variants related to metrics.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("timeout after {0:?} when {1}")]
    Timeout(Duration, String),

    #[error("unison is shutting down")]
    ShuttingDown,
}

/// Wait is a wrapper of the Metrics channel that impls several utils to wait
/// for metrics to satisfy some condition.
pub struct Wait {
    pub timeout: Duration,
    pub rx: watch::Receiver<Metrics>,
}

impl Wait {
    /// Wait for metrics to satisfy some condition or timeout.
    #[tracing::instrument(level = "trace", skip(self, func), fields(msg=%msg.to_string()))]
    pub async fn metrics<T>(
        &self,
        func: T,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError>
    where
        T: Fn(&Metrics) -> bool + Send,
    {
        let timeout_at = Instant::now() + self.timeout;

        let mut rx = self.rx.clone();
        loop {
            let latest = rx.borrow().clone();

            tracing::debug!(
                "id={} wait {:} latest: {}",
                latest.id,
                msg.to_string(),
                latest
            );

            if func(&latest) {
                tracing::debug!(
                    "id={} done wait {:} latest: {}",
                    latest.id,
                    msg.to_string(),
                    latest
                );
                return Ok(latest);
            }

            let now = Instant::now();
            if now >= timeout_at {
                return Err(WaitError::Timeout(
                    self.timeout,
                    format!("{} latest: {}", msg.to_string(), latest),
                ));
            }

            let sleep_time = timeout_at - now;
            tracing::debug!(?sleep_time, "wait timeout");
            let delay = tokio::time::sleep(sleep_time);

            futures::select_biased! {
                _ = delay.fuse() => {
                    tracing::debug!( "id={} timeout wait {:} latest: {}", latest.id, msg.to_string(), latest );
                    return Err(WaitError::Timeout(self.timeout, format!("{} latest: {}", msg.to_string(), latest)));
                }
                changed = rx.changed().fuse() => {
                    match changed {
                        Ok(_) => {
                            // metrics changed, continue the waiting loop
                        },
                        Err(err) => {
                            tracing::debug!(
                                "id={} error: {:?}; wait {:} latest: {:?}",
                                latest.id,
                                err,
                                msg.to_string(),
                                latest
                            );

                            return Err(WaitError::ShuttingDown);
                        }
                    }
                }
            };
        }
    }

    /// Wait for the coordinator state to become `want_state` or timeout.
    #[tracing::instrument(level = "trace", skip(self), fields(msg=msg.to_string().as_str()))]
    pub async fn state(
        &self,
        want_state: NodeState,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.metrics(
            |m| m.state == want_state,
            &format!("{} .state == {:?}", msg.to_string(), want_state),
        )
        .await
    }

    /// Wait for `elected` to become `want` or timeout.
    #[tracing::instrument(level = "trace", skip(self), fields(msg=msg.to_string().as_str()))]
    pub async fn elected(
        &self,
        want: Option<NodeId>,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.eq(Metric::Elected(want), msg).await
    }

    /// Wait for the accepted view version to become at least `version`.
    #[tracing::instrument(level = "trace", skip(self), fields(msg=msg.to_string().as_str()))]
    pub async fn view_version(
        &self,
        version: u64,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.ge(Metric::ViewVersion(Some(version)), msg).await
    }

    /// Wait until the accepted view contains exactly `want` members, in join
    /// order.
    ///
    /// This is how a test probe establishes that a membership change has
    /// propagated to a node before asserting on election results.
    #[tracing::instrument(level = "trace", skip(self), fields(msg=msg.to_string().as_str()))]
    pub async fn members(
        &self,
        want: Vec<NodeId>,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.metrics(
            |m| m.members == want,
            &format!("{} .members == {:?}", msg.to_string(), want),
        )
        .await
    }

    /// Block until a metric becomes greater than or equal the specified value
    /// or timeout.
    ///
    /// For example, to await until the view version becomes 2 or greater:
    /// ```ignore
    /// my_node.wait(None).ge(Metric::ViewVersion(Some(2)), "view 2").await?;
    /// ```
    pub async fn ge(
        &self,
        metric: Metric,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.until(Condition::ge(metric), msg).await
    }

    /// Block until a metric becomes equal to the specified value or timeout.
    ///
    /// For example, to await until the elected member becomes exactly `b`:
    /// ```ignore
    /// my_node.wait(None).eq(Metric::Elected(Some(s("b"))), "b elected").await?;
    /// ```
    pub async fn eq(
        &self,
        metric: Metric,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.until(Condition::eq(metric), msg).await
    }

    /// Block until a metric satisfies the specified condition or timeout.
    #[tracing::instrument(level = "trace", skip_all, fields(cond=cond.to_string(), msg=msg.to_string().as_str()))]
    pub(crate) async fn until(
        &self,
        cond: Condition,
        msg: impl ToString,
    ) -> Result<Metrics, WaitError> {
        self.metrics(
            |metrics| match &cond {
                Condition::GE(expect) => metrics >= expect,
                Condition::EQ(expect) => metrics == expect,
            },
            &format!("{} .{}", msg.to_string(), cond),
        )
        .await
    }
}
