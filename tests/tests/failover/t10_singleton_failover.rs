use anyhow::Result;
use unison::Config;
use unison::NodeState;

use crate::fixtures::s;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;
use crate::fixtures::Cluster;

/// The classic two-node singleton failover dance, with `b` preferred.
///
/// - `{a}`: `a` hosts the singleton.
/// - `{a,b}`: the preferred `b` takes over.
/// - `b` leaves: `a` takes over as the only survivor.
/// - `b` rejoins as the youngest member: preference trumps age, `b` again.
/// - `a` leaves: `b` keeps the singleton without a restart.
/// - `a` rejoins: `b` is still preferred.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn singleton_failover() -> Result<()> {
    let cluster = Cluster::new(Config {
        preferred: Some(s("b")),
        ..Default::default()
    });

    tracing::info!("--- view {{a}}: a hosts the singleton");
    let ua = cluster.add_node("a").await;
    ua.wait(timeout()).state(NodeState::Active, "a active").await?;
    assert_eq!(Some(s("a")), cluster.active_node());

    tracing::info!("--- view {{a,b}}: preferred b takes over");
    let ub = cluster.add_node("b").await;
    ub.wait(timeout()).state(NodeState::Active, "b active").await?;
    ua.wait(timeout()).state(NodeState::Inactive, "a ceded").await?;
    assert_eq!(Some(s("b")), cluster.active_node());

    tracing::info!("--- b leaves: a takes over");
    cluster.remove_node(&s("b")).await?;
    ua.wait(timeout()).state(NodeState::Active, "a again").await?;
    ua.wait(timeout()).members(vec![s("a")], "a alone").await?;
    assert_eq!(Some(s("a")), cluster.active_node());

    tracing::info!("--- b rejoins as the youngest: preference wins again");
    let ub = cluster.add_node("b").await;
    ub.wait(timeout()).state(NodeState::Active, "b back").await?;
    ua.wait(timeout()).state(NodeState::Inactive, "a ceded again").await?;
    assert_eq!(Some(s("b")), cluster.active_node());

    // b rejoined at the end of the join order; it still won.
    let m = ub.wait(timeout()).members(vec![s("a"), s("b")], "order").await?;
    assert_eq!(Some(s("b")), m.elected);

    tracing::info!("--- a leaves: b keeps the singleton");
    cluster.remove_node(&s("a")).await?;
    ub.wait(timeout()).members(vec![s("b")], "b alone").await?;
    ub.wait(timeout()).state(NodeState::Active, "b still active").await?;
    assert_eq!(Some(s("b")), cluster.active_node());

    tracing::info!("--- a rejoins: b is still preferred");
    let ua = cluster.add_node("a").await;
    ua.wait(timeout()).elected(Some(s("b")), "b keeps it").await?;
    ub.wait(timeout()).members(vec![s("b"), s("a")], "order flipped").await?;
    assert_eq!(Some(s("b")), cluster.active_node());
    assert!(!ua.is_active().await);

    cluster.remove_node(&s("a")).await?;
    ub.shutdown().await?;
    assert_eq!(None, cluster.active_node());

    Ok(())
}
