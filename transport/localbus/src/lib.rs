//! An in-process membership bus for `unison` nodes.
//!
//! [`ClusterBus`] plays the role a group-membership stack plays in a real
//! deployment: it tracks joined members in join order, stamps every
//! membership change with a strictly increasing version, and delivers the
//! resulting [`View`] to every member. A member whose coordinator has quit
//! is evicted on the next broadcast, which produces a new view and thereby
//! forces re-election, the same way a failure detector would.

use std::sync::Arc;
use std::sync::Mutex;

use tracing::debug;
use tracing::info;
use unison::Node;
use unison::NodeId;
use unison::Unison;
use unison::View;

#[derive(Default)]
struct BusInner {
    /// Version of the last published view. 0 means nothing published yet.
    version: u64,

    /// Members in join order, oldest first.
    members: Vec<(NodeId, Node, Unison)>,
}

impl BusInner {
    fn view(&self) -> View {
        let members = self
            .members
            .iter()
            .map(|(id, node, _)| (id.clone(), node.clone()))
            .collect::<Vec<_>>();

        View::new(self.version, members)
    }

    fn contains(&self, node_id: &NodeId) -> bool {
        self.members.iter().any(|(id, _, _)| id == node_id)
    }
}

/// An in-process cluster: every joined [`Unison`] handle receives every view.
#[derive(Default, Clone)]
pub struct ClusterBus {
    inner: Arc<Mutex<BusInner>>,
}

impl ClusterBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The view the bus would publish right now.
    pub fn current_view(&self) -> View {
        let inner = self.inner.lock().unwrap();
        inner.view()
    }

    pub fn get_peer(&self, node_id: &NodeId) -> Option<Unison> {
        let inner = self.inner.lock().unwrap();
        inner
            .members
            .iter()
            .find(|(id, _, _)| id == node_id)
            .map(|(_, _, handle)| handle.clone())
    }

    /// Add a member at the end of the join order and publish a new view.
    ///
    /// A rejoining member joins as the youngest, it does not reclaim its
    /// old position.
    pub async fn join(&self, node_id: NodeId, node: Node, handle: Unison) {
        let view = {
            let mut inner = self.inner.lock().unwrap();

            if inner.contains(&node_id) {
                debug!("node {} is already a member, ignore join", node_id);
                return;
            }

            inner.members.push((node_id.clone(), node, handle));
            inner.version += 1;
            inner.view()
        };

        info!("node {} joined, publishing {}", node_id, view);
        self.broadcast(view).await;
    }

    /// Remove a member and publish a new view to the remaining members.
    ///
    /// The departed handle is returned so the caller can shut it down; the
    /// bus stops delivering views to it but does not stop its service.
    pub async fn leave(&self, node_id: &NodeId) -> Option<Unison> {
        let (handle, view) = {
            let mut inner = self.inner.lock().unwrap();

            let pos =
                inner.members.iter().position(|(id, _, _)| id == node_id)?;
            let (_, _, handle) = inner.members.remove(pos);

            inner.version += 1;
            (handle, inner.view())
        };

        info!("node {} left, publishing {}", node_id, view);
        self.broadcast(view).await;

        Some(handle)
    }

    /// Deliver `view` to every member, evicting the ones that are gone.
    ///
    /// A member whose coordinator has quit fails the delivery. Each eviction
    /// produces a newer view, which is then broadcast in turn, until a
    /// delivery round completes with every remaining member alive.
    async fn broadcast(&self, view: View) {
        let mut view = view;

        loop {
            let targets = {
                let inner = self.inner.lock().unwrap();
                inner
                    .members
                    .iter()
                    .map(|(id, _, handle)| (id.clone(), handle.clone()))
                    .collect::<Vec<_>>()
            };

            let mut dead = Vec::new();

            for (id, handle) in targets {
                let res = handle.deliver_view(view.clone()).await;

                if let Err(err) = res {
                    info!("node {} rejected {}: {}; evicting", id, view, err);
                    dead.push(id);
                }
            }

            if dead.is_empty() {
                return;
            }

            view = {
                let mut inner = self.inner.lock().unwrap();
                inner.members.retain(|(id, _, _)| !dead.contains(id));
                inner.version += 1;
                inner.view()
            };

            info!("evicted {} member(s), publishing {}", dead.len(), view);
        }
    }
}
