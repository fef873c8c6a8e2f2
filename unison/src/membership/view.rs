use core::fmt;

use crate::membership::Node;
use crate::membership::NodeId;

/// An agreed, versioned membership view of the cluster.
///
/// Members are kept in join order: the position of a member is its joined-at
/// ordering, and the member at the front is the oldest survivor. A view never
/// contains duplicate members. The empty view is valid and elects no one.
///
/// Views are superseded, never updated: a coordinator must ignore any view
/// whose version is not strictly greater than the last one it processed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct View {
    version: u64,
    members: Vec<(NodeId, Node)>,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}:{{", self.version)?;

        for (i, (node_id, _node)) in self.members.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{node_id}")?;
        }

        write!(f, "}}")?;
        Ok(())
    }
}

impl View {
    /// Create a new view from members in join order.
    ///
    /// If a member id occurs more than once, the earliest occurrence keeps
    /// its position and later ones are dropped.
    pub fn new(
        version: u64,
        members: impl IntoIterator<Item = (NodeId, Node)>,
    ) -> Self {
        let mut ms: Vec<(NodeId, Node)> = Vec::new();

        for (id, node) in members {
            if ms.iter().any(|(present, _)| present == &id) {
                continue;
            }
            ms.push((id, node));
        }

        View {
            version,
            members: ms,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the given member is present in this view.
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.members.iter().any(|(id, _)| id == node_id)
    }

    /// Returns an Iterator of all members, in join order.
    pub fn members(&self) -> impl Iterator<Item = (&NodeId, &Node)> {
        self.members.iter().map(|(id, node)| (id, node))
    }

    /// Returns an Iterator of all member ids, in join order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.members.iter().map(|(id, _)| id)
    }

    /// Get a member's node info by id.
    pub fn get_node(&self, node_id: &NodeId) -> Option<&Node> {
        self.members
            .iter()
            .find(|(id, _)| id == node_id)
            .map(|(_, node)| node)
    }

    /// The surviving member with the earliest join position.
    pub fn oldest(&self) -> Option<&NodeId> {
        self.members.first().map(|(id, _)| id)
    }
}
