mod logging;

use std::sync::Arc;
use std::time::Duration;

use localbus::ClusterBus;
use nodename::ActiveRegistry;
use nodename::NodeNameService;
use unison::Node;
use unison::Unison;

use crate::logging::init_logging;

fn nid(id: impl ToString) -> unison::NodeId {
    id.to_string()
}

fn spawn_node(
    id: &str,
    config: &Arc<unison::Config>,
    registry: &ActiveRegistry,
) -> Unison {
    let service = NodeNameService::new(nid(id), registry.clone());
    Unison::new(nid(id), config.clone(), service)
}

/// Walk a two-node cluster through the classic singleton failover dance:
/// the preferred node holds the singleton whenever it is a member, and the
/// oldest survivor takes over as soon as it leaves.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let g = init_logging("unison", "_log", "DEBUG");
    Box::leak(Box::new(g));

    let timeout = Some(Duration::from_millis(1_000));

    // Everyone prefers node b; with b absent, the oldest member wins.
    let config = Arc::new(unison::Config {
        preferred: Some(nid("b")),
        ..Default::default()
    });

    let bus = ClusterBus::new();
    let registry = ActiveRegistry::new();

    // a joins alone: nobody else around, a hosts the singleton.
    let ua = spawn_node("a", &config, &registry);
    bus.join(nid("a"), Node::new("127.0.0.1:8081"), ua.clone()).await;

    ua.wait(timeout).elected(Some(nid("a")), "a alone").await?;
    println!("[view 1] {{a}}: active on {:?}", registry.query());

    // b joins and is preferred: the singleton moves from a to b.
    let ub = spawn_node("b", &config, &registry);
    bus.join(nid("b"), Node::new("127.0.0.1:8082"), ub.clone()).await;

    ub.wait(timeout).elected(Some(nid("b")), "b preferred").await?;
    ua.wait(timeout).elected(Some(nid("b")), "a cedes").await?;
    println!("[view 2] {{a,b}}: active on {:?}", registry.query());

    // b leaves: a is the oldest (and only) survivor and takes over.
    let departed = bus.leave(&nid("b")).await;
    if let Some(b) = departed {
        b.shutdown().await?;
    }

    ua.wait(timeout).elected(Some(nid("a")), "b gone").await?;
    println!("[view 3] {{a}}: active on {:?}", registry.query());

    // b rejoins as the youngest member, but preference trumps age.
    let ub = spawn_node("b", &config, &registry);
    bus.join(nid("b"), Node::new("127.0.0.1:8082"), ub.clone()).await;

    ua.wait(timeout).elected(Some(nid("b")), "b is back").await?;
    println!("[view 4] {{a,b}}: active on {:?}", registry.query());

    // a leaves: b keeps the singleton without a restart.
    let departed = bus.leave(&nid("a")).await;
    if let Some(a) = departed {
        a.shutdown().await?;
    }

    ub.wait(timeout).elected(Some(nid("b")), "b stays").await?;
    println!("[view 5] {{b}}: active on {:?}", registry.query());

    ub.shutdown().await?;
    println!("[done] all nodes stopped, active: {:?}", registry.query());

    Ok(())
}
