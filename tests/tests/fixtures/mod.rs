//! Fixtures for testing unison clusters.

#![allow(dead_code)]


use std::future::Future;
use std::io;
use std::panic::PanicHookInfo;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::Once;
use std::time::Duration;

use lazy_static::lazy_static;
use localbus::ClusterBus;
use nodename::ActiveRegistry;
use nodename::NodeNameService;
#[allow(unused_imports)] use pretty_assertions::assert_eq;
#[allow(unused_imports)] use pretty_assertions::assert_ne;
use tracing_appender::non_blocking::WorkerGuard;
use unison::async_trait;
use unison::Config;
use unison::Node;
use unison::NodeId;
use unison::Service;
use unison::Unison;

use crate::fixtures::logging::init_file_logging;

pub fn init_default_ut_tracing() {
    static START: Once = Once::new();

    START.call_once(|| {
        let mut g = GLOBAL_UT_LOG_GUARD.as_ref().lock().unwrap();
        *g = Some(init_global_tracing("ut", "_log", "DEBUG"));
    });
}

lazy_static! {
    static ref GLOBAL_UT_LOG_GUARD: Arc<Mutex<Option<WorkerGuard>>> =
        Arc::new(Mutex::new(None));
}

pub fn init_global_tracing(
    app_name: &str,
    dir: &str,
    level: &str,
) -> WorkerGuard {
    set_panic_hook();

    let (g, sub) = init_file_logging(app_name, dir, level);
    tracing::subscriber::set_global_default(sub)
        .expect("error setting global tracing subscriber");

    tracing::info!(
        "initialized global tracing: in {}/{} at {}",
        dir,
        app_name,
        level
    );
    g
}

pub fn set_panic_hook() {
    std::panic::set_hook(Box::new(|panic| {
        log_panic(panic);
    }));
}

pub fn log_panic(panic: &PanicHookInfo) {
    let backtrace = format!("{:?}", std::backtrace::Backtrace::force_capture());

    eprintln!("{}", panic);

    if let Some(location) = panic.location() {
        tracing::error!(
            message = %panic,
            backtrace = %backtrace,
            panic.file = location.file(),
            panic.line = location.line(),
            panic.column = location.column(),
        );
    } else {
        tracing::error!(message = %panic, backtrace = %backtrace);
    }
}

/// The harness wrapping every async cluster test: set up ut tracing, build a
/// multi-threaded runtime and block on the test.
pub fn ut_harness<Fut>(test: impl FnOnce() -> Fut + 'static)
where Fut: Future<Output = anyhow::Result<()>> {
    init_default_ut_tracing();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(test()).unwrap();
}

/// Shorthand for building a [`NodeId`].
pub fn s(x: impl ToString) -> NodeId {
    x.to_string()
}

/// A generous default, most waits resolve in a few milliseconds.
pub fn timeout() -> Option<Duration> {
    Some(Duration::from_millis(5_000))
}

/// A local cluster of unison nodes sharing one bus and one registry.
///
/// Every node spawned through the cluster runs a [`NodeNameService`], so
/// `active_node()` answers which member currently hosts the singleton.
pub struct Cluster {
    pub config: Arc<Config>,
    pub bus: ClusterBus,
    pub registry: ActiveRegistry,
}

impl Cluster {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            bus: ClusterBus::new(),
            registry: ActiveRegistry::new(),
        }
    }

    /// Spawn a node running a [`NodeNameService`] and join it to the bus.
    pub async fn add_node(&self, id: impl ToString) -> Unison {
        let id = s(id);
        let service = NodeNameService::new(id.clone(), self.registry.clone());
        self.add_node_with(id, service).await
    }

    /// Spawn a node running the given service and join it to the bus.
    pub async fn add_node_with<S>(&self, id: NodeId, service: S) -> Unison
    where S: Service {
        let handle = Unison::new(id.clone(), self.config.clone(), service);

        self.bus.join(id.clone(), Node::new(""), handle.clone()).await;
        handle
    }

    /// Remove a node from the bus and shut it down.
    pub async fn remove_node(&self, id: &NodeId) -> anyhow::Result<()> {
        let handle = self.bus.leave(id).await;

        if let Some(handle) = handle {
            handle.shutdown().await?;
        }
        Ok(())
    }

    /// The node currently hosting the singleton, per the shared registry.
    pub fn active_node(&self) -> Option<NodeId> {
        self.registry.query()
    }
}

/// A service whose starts fail a configured number of times before
/// succeeding; stop always succeeds.
#[derive(Clone)]
pub struct FlakyService {
    id: NodeId,
    registry: ActiveRegistry,

    remaining_start_failures: Arc<AtomicU64>,
    pub start_calls: Arc<AtomicU64>,
}

impl FlakyService {
    pub fn new(
        id: NodeId,
        registry: ActiveRegistry,
        start_failures: u64,
    ) -> Self {
        Self {
            id,
            registry,
            remaining_start_failures: Arc::new(AtomicU64::new(start_failures)),
            start_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn start_call_count(&self) -> u64 {
        self.start_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Service for FlakyService {
    async fn start(&mut self) -> Result<(), io::Error> {
        self.start_calls.fetch_add(1, Ordering::Relaxed);

        let remaining =
            self.remaining_start_failures.load(Ordering::Relaxed);
        if remaining > 0 {
            self.remaining_start_failures
                .store(remaining - 1, Ordering::Relaxed);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "injected start failure",
            ));
        }

        let mut inner = NodeNameService::new(
            self.id.clone(),
            self.registry.clone(),
        );
        inner.start().await
    }

    async fn stop(&mut self) -> Result<(), io::Error> {
        let mut inner = NodeNameService::new(
            self.id.clone(),
            self.registry.clone(),
        );
        inner.stop().await
    }
}

/// A service that starts fine but refuses to stop.
#[derive(Clone)]
pub struct StuckService {
    id: NodeId,
    registry: ActiveRegistry,
}

impl StuckService {
    pub fn new(id: NodeId, registry: ActiveRegistry) -> Self {
        Self { id, registry }
    }
}

#[async_trait]
impl Service for StuckService {
    async fn start(&mut self) -> Result<(), io::Error> {
        let mut inner = NodeNameService::new(
            self.id.clone(),
            self.registry.clone(),
        );
        inner.start().await
    }

    async fn stop(&mut self) -> Result<(), io::Error> {
        Err(io::Error::new(
            io::ErrorKind::Other,
            "injected stop failure",
        ))
    }
}
