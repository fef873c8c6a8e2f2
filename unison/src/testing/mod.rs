//! Testing utilities used by unison tests.

use std::fmt;

use crate::membership::Node;
use crate::membership::NodeId;
use crate::membership::View;

/// Create a node ID for testing.
pub fn nid(id: impl fmt::Display) -> NodeId {
    id.to_string()
}

/// Create a versioned view for testing, with blank node addresses.
///
/// Member order is join order: `view(1, ["a", "b"])` makes `a` the oldest.
pub fn view<const N: usize>(version: u64, ids: [&str; N]) -> View {
    let members: Vec<_> = ids.into_iter().map(|id| (nid(id), Node::new(""))).collect();
    View::new(version, members)
}
