use std::cmp::Ordering;

use crate::membership::NodeId;
use crate::metrics::metric_display::MetricDisplay;
use crate::Metrics;

/// A metric entry of a node.
///
/// This is used to specify which metric to observe.
#[derive(Debug)]
pub enum Metric {
    ViewVersion(Option<u64>),
    Elected(Option<NodeId>),
}

impl Metric {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Metric::ViewVersion(_) => "view_version",
            Metric::Elected(_) => "elected",
        }
    }

    pub(crate) fn value(&self) -> MetricDisplay<'_> {
        MetricDisplay { metric: self }
    }
}

/// Metric can be compared with Metrics by comparing the corresponding field
/// of Metrics.
impl PartialEq<Metric> for Metrics {
    fn eq(&self, other: &Metric) -> bool {
        match other {
            Metric::ViewVersion(v) => self.view_version == *v,
            Metric::Elected(v) => &self.elected == v,
        }
    }
}

/// Metric can be compared with Metrics by comparing the corresponding field
/// of Metrics.
impl PartialOrd<Metric> for Metrics {
    fn partial_cmp(&self, other: &Metric) -> Option<Ordering> {
        match other {
            Metric::ViewVersion(v) => Some(self.view_version.cmp(v)),
            Metric::Elected(v) => self.elected.partial_cmp(v),
        }
    }
}
