use core::fmt;

use crate::base::display_ext::DisplayOptionExt;
use crate::membership::NodeId;
use crate::membership::View;

/// The preference rule driving elections.
///
/// Election is a pure, side-effect-free function of a view and this rule.
/// Every node applies the same rule to the same view data and therefore
/// reaches the same verdict, which is what keeps the cluster free of split
/// elections without any cross-node agreement round. The rule must not
/// involve any local-only tie breaking such as randomness.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Preference {
    /// The member favored whenever it is present in the view.
    pub preferred: Option<NodeId>,
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prefer:{}", self.preferred.display())
    }
}

impl Preference {
    pub fn new(preferred: Option<NodeId>) -> Self {
        Preference { preferred }
    }

    /// Elect the member of `view` that should host the active singleton.
    ///
    /// - The preferred member, if present in the view.
    /// - Otherwise the oldest surviving member, i.e. the one with the
    ///   earliest join position.
    /// - `None` for the empty view: no singleton is active anywhere.
    ///
    /// A preferred member that is not (or never was) in the view is not an
    /// error; the fallback applies until it joins.
    pub fn elect(&self, view: &View) -> Option<NodeId> {
        if let Some(preferred) = &self.preferred {
            if view.contains(preferred) {
                return Some(preferred.clone());
            }
        }

        view.oldest().cloned()
    }
}
