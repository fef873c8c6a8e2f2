use anyhow::Result;
use unison::Config;

use crate::fixtures::s;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;
use crate::fixtures::Cluster;

/// `Wait::members` establishes that a membership change has propagated to a
/// node before anything is asserted about the election.
///
/// Every joined node converges on the same member list, in join order.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn members_probe() -> Result<()> {
    let cluster = Cluster::new(Config::default());

    let ua = cluster.add_node("a").await;
    let ub = cluster.add_node("b").await;
    let uc = cluster.add_node("c").await;

    tracing::info!("--- all three nodes see {{a,b,c}}");
    for u in [&ua, &ub, &uc] {
        u.wait(timeout())
            .members(vec![s("a"), s("b"), s("c")], "full membership")
            .await?;
    }

    tracing::info!("--- b leaves; survivors see {{a,c}}");
    cluster.remove_node(&s("b")).await?;

    for u in [&ua, &uc] {
        u.wait(timeout())
            .members(vec![s("a"), s("c")], "after b left")
            .await?;
    }

    assert_eq!(
        vec![s("a"), s("c")],
        cluster.bus.current_view().node_ids().cloned().collect::<Vec<_>>()
    );

    Ok(())
}
