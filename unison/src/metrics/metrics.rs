use std::fmt;

use crate::base::display_ext::DisplayOptionExt;
use crate::errors::Fatal;
use crate::membership::NodeId;
use crate::metrics::NodeState;

/// A set of metrics describing the current state of a node's coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct Metrics {
    /// `Ok(())` while the coordinator task runs; the fatal error once it has
    /// quit.
    pub running_state: Result<(), Fatal>,

    /// The ID of this node.
    pub id: NodeId,

    /// Whether the local service instance is running.
    pub state: NodeState,

    /// The member elected to host the singleton, derived from the last
    /// accepted view.
    ///
    /// `None` while no view has been delivered, or when the view is empty.
    pub elected: Option<NodeId>,

    /// The version of the last accepted view.
    pub view_version: Option<u64>,

    /// The members of the last accepted view, in join order.
    pub members: Vec<NodeId>,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metrics{{")?;

        write!(
            f,
            "id:{}, {:?}, elected:{}, view:{}, members:{{",
            self.id,
            self.state,
            self.elected.display(),
            self.view_version.display(),
        )?;

        for (i, id) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, "}}")?;

        if let Err(err) = &self.running_state {
            write!(f, ", stopped:{}", err)?;
        }

        write!(f, "}}")?;
        Ok(())
    }
}

impl Metrics {
    pub fn new_initial(id: NodeId) -> Self {
        Self {
            running_state: Ok(()),
            id,

            state: NodeState::Inactive,
            elected: None,
            view_version: None,
            members: Vec::new(),
        }
    }
}
