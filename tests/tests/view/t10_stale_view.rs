use std::sync::Arc;

use anyhow::Result;
use nodename::ActiveRegistry;
use nodename::NodeNameService;
use unison::Config;
use unison::Node;
use unison::NodeState;
use unison::Unison;
use unison::View;

use crate::fixtures::s;
use crate::fixtures::timeout;
use crate::fixtures::ut_harness;

fn view(version: u64, ids: &[&str]) -> View {
    let members =
        ids.iter().map(|id| (s(id), Node::new(""))).collect::<Vec<_>>();
    View::new(version, members)
}

/// A view must be strictly newer than the last accepted one to take effect.
///
/// Views are delivered by hand, bypassing the bus:
/// - v2 `{a}` is accepted; `a` activates.
/// - v1 `{a,b}` arrives late and is dropped; `a` stays active.
/// - v2 `{a,b}` is a duplicate version and is dropped too.
/// - v3 `{b,a}` is newer and takes effect.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn stale_view_is_dropped() -> Result<()> {
    let config = Arc::new(Config::default());
    let registry = ActiveRegistry::new();

    let service = NodeNameService::new(s("a"), registry.clone());
    let ua = Unison::new(s("a"), config, service);

    tracing::info!("--- v2 {{a}} is accepted");
    ua.deliver_view(view(2, &["a"])).await?;
    ua.wait(timeout()).state(NodeState::Active, "a active").await?;

    tracing::info!("--- v1 {{a,b}} arrives late; dropped");
    ua.deliver_view(view(1, &["a", "b"])).await?;

    tracing::info!("--- v2 {{a,b}} is a duplicate version; dropped");
    ua.deliver_view(view(2, &["a", "b"])).await?;

    tracing::info!("--- v3 {{b,a}} takes effect");
    ua.deliver_view(view(3, &["b", "a"])).await?;

    let m = ua.wait(timeout()).elected(Some(s("b")), "v3 elects b").await?;

    // v1 and the duplicate v2 left no trace.
    assert_eq!(Some(3), m.view_version);
    assert_eq!(vec![s("b"), s("a")], m.members);

    ua.wait(timeout()).state(NodeState::Inactive, "a ceded").await?;
    assert_eq!(None, registry.query());

    ua.shutdown().await?;
    Ok(())
}

/// The empty view is valid: it elects no one and stops the active instance.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn empty_view_elects_no_one() -> Result<()> {
    let config = Arc::new(Config::default());
    let registry = ActiveRegistry::new();

    let service = NodeNameService::new(s("a"), registry.clone());
    let ua = Unison::new(s("a"), config, service);

    ua.deliver_view(view(1, &["a"])).await?;
    ua.wait(timeout()).state(NodeState::Active, "a active").await?;

    tracing::info!("--- v2 {{}} deactivates the singleton everywhere");
    ua.deliver_view(view(2, &[])).await?;

    let m = ua.wait(timeout()).elected(None, "no one elected").await?;
    assert_eq!(NodeState::Inactive, m.state);
    assert_eq!(None, registry.query());

    ua.shutdown().await?;
    Ok(())
}

/// Skipped versions are fine: a node only requires versions to increase, not
/// to be consecutive.
#[tracing::instrument]
#[test_harness::test(harness = ut_harness)]
async fn version_gap_is_accepted() -> Result<()> {
    let config = Arc::new(Config::default());
    let registry = ActiveRegistry::new();

    let service = NodeNameService::new(s("a"), registry.clone());
    let ua = Unison::new(s("a"), config, service);

    ua.deliver_view(view(1, &["a"])).await?;
    ua.wait(timeout()).view_version(1, "v1").await?;

    tracing::info!("--- jump from v1 straight to v7");
    ua.deliver_view(view(7, &["a", "b"])).await?;

    let m = ua.wait(timeout()).view_version(7, "v7").await?;
    assert_eq!(vec![s("a"), s("b")], m.members);

    ua.shutdown().await?;
    Ok(())
}
