use crate::audit::AUDIT_TARGET;
use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, filter, fmt, prelude::*};

fn rolling(config: &AppConfig, file: &str) -> RollingFileAppender {
    match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, file),
        _ => tracing_appender::rolling::never(&config.log_dir, file),
    }
}

/// Install the global subscriber
///
/// Keep the returned guards alive for the life of the process; dropping
/// them flushes and stops the background writers.
pub fn init_logging(config: &AppConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::with_capacity(2);

    let (non_blocking, guard) = tracing_appender::non_blocking(rolling(config, &config.log_file));
    guards.push(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    // Audit events always reach the audit file, whatever the main filter says
    let audit_layer = config.audit_log_file.as_ref().map(|file| {
        let (audit_writer, audit_guard) = tracing_appender::non_blocking(rolling(config, file));
        guards.push(audit_guard);
        fmt::layer()
            .json()
            .with_target(true)
            .with_writer(audit_writer)
            .with_ansi(false)
            .with_filter(filter::filter_fn(|meta| meta.target() == AUDIT_TARGET))
    });

    let registry = tracing_subscriber::registry().with(audit_layer);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true) // Keep target in JSON for structured queries
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_filter(filter);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry
            .with(file_layer.and_then(stdout_layer).with_filter(filter))
            .init();
    }

    guards
}
