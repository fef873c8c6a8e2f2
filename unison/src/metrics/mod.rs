//! Unison metrics for observability.
//!
//! Metrics are observed on a running node via [`Unison::metrics()`]
//! (`crate::Unison::metrics`), which returns a watch channel of [`Metrics`].
//!
//! [`Metrics`] reports, per node:
//!
//! - whether the local service instance is currently active,
//! - which member is considered the elected owner of the singleton,
//! - the version and member list of the last accepted view,
//! - whether the coordinator task is still running.
//!
//! This is the primitive behind the "which node answered" probe of the
//! originating scenario: a caller asks any node for the elected member and
//! routes there.
//!
//! Metrics is not a stream: the watch channel stores only the latest state,
//! so it guarantees the latest value but not every intermediate change.

mod metric;
mod metric_display;
mod metrics;
mod node_state;
mod wait;
mod wait_condition;

pub use metric::Metric;
pub use metrics::Metrics;
pub use node_state::NodeState;
pub use wait::Wait;
pub use wait::WaitError;
pub(crate) use wait_condition::Condition;
