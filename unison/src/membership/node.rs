use std::fmt::Display;
use std::fmt::Formatter;

/// `NodeId` uniquely identifies a member within the cluster.
///
/// Using a distinct type for `NodeId` enhances type safety and clarity.
/// It can be extended in the future to support more complex identifiers.
pub type NodeId = String;

/// `Node` carries the per-member information a view is annotated with.
///
/// The coordinator itself only consumes member ids; the address is for the
/// surrounding application, e.g. to route a "which node is active" query to
/// the elected member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// The network address (e.g., IP and port) of the node.
    pub address: String,
}

impl Node {
    pub fn new(address: impl ToString) -> Self {
        Node {
            address: address.to_string(),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}
