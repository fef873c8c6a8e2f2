use std::env;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// Set up rolling-file tracing for the demo.
///
/// The log level is taken from env `RUST_LOG` if present, otherwise `level`.
/// The returned guard must be kept alive for the life of the program.
pub fn init_logging(app_name: &str, dir: &str, level: &str) -> WorkerGuard {
    let f = RollingFileAppender::new(Rotation::HOURLY, dir, app_name);
    let (writer, writer_guard) = tracing_appender::non_blocking(f);

    let f_layer = fmt::Layer::new()
        .with_span_events(fmt::format::FmtSpan::NONE)
        .with_writer(writer)
        .with_ansi(false);

    let directives =
        env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_x| level.to_string());
    let env_filter = EnvFilter::new(directives);

    let subscriber = Registry::default().with(env_filter).with(f_layer);

    tracing::subscriber::set_global_default(subscriber)
        .expect("error setting global tracing subscriber");

    tracing::info!(
        "initialized global tracing: in {}/{} at {}",
        dir,
        app_name,
        level
    );

    writer_guard
}
