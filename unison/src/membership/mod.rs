//! Cluster membership: member identity and versioned views.
//!
//! A [`View`] is the agreed, versioned set of currently live members, as
//! delivered by the underlying group-membership protocol. Unison never
//! mutates a view in place: every membership change produces a new view with
//! a strictly greater version, and each node holds its own immutable copy.

mod node;
mod view;


pub use node::Node;
pub use node::NodeId;
pub use view::View;
