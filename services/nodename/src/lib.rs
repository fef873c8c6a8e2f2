//! A minimal singleton payload implementing the [`Service`] trait.
//!
//! The payload is a node-name announcer: while active it publishes its own
//! node name into a cluster-shared [`ActiveRegistry`], so any member can
//! answer "which node hosts the singleton right now". With at most one
//! active instance in the cluster, the registry holds at most one name.

use std::io::Error;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::debug;
use unison::async_trait;
use unison::NodeId;
use unison::Service;

/// A cluster-shared slot naming the node whose instance is active.
#[derive(Debug, Clone, Default)]
pub struct ActiveRegistry {
    active: Arc<Mutex<Option<NodeId>>>,
}

impl ActiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The name of the node whose instance is active, if any.
    pub fn query(&self) -> Option<NodeId> {
        let active = self.active.lock().unwrap();
        active.clone()
    }

    fn publish(&self, node_id: NodeId) {
        let mut active = self.active.lock().unwrap();
        debug!(
            "ActiveRegistry: publish {} (was: {:?})",
            node_id, active
        );
        *active = Some(node_id);
    }

    fn withdraw(&self, node_id: &NodeId) {
        let mut active = self.active.lock().unwrap();

        // During a transition the new instance may have published already.
        // Only clear the slot if it still names this node.
        if active.as_ref() == Some(node_id) {
            debug!("ActiveRegistry: withdraw {}", node_id);
            *active = None;
        } else {
            debug!(
                "ActiveRegistry: skip withdraw {}, slot holds {:?}",
                node_id, active
            );
        }
    }
}

/// A [`Service`] announcing its node name while active.
#[derive(Debug, Clone)]
pub struct NodeNameService {
    id: NodeId,
    registry: ActiveRegistry,
}

impl NodeNameService {
    pub fn new(id: NodeId, registry: ActiveRegistry) -> Self {
        Self { id, registry }
    }
}

#[async_trait]
impl Service for NodeNameService {
    async fn start(&mut self) -> Result<(), Error> {
        debug!("NodeNameService::start: id={}", self.id);
        self.registry.publish(self.id.clone());
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Error> {
        debug!("NodeNameService::stop: id={}", self.id);
        self.registry.withdraw(&self.id);
        Ok(())
    }
}
