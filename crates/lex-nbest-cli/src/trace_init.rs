use std::path::Path;

#[cfg(feature = "trace")]
pub use tracing_appender::non_blocking::WorkerGuard as TraceGuard;

/// Placeholder guard for builds without the `trace` feature.
#[cfg(not(feature = "trace"))]
pub struct TraceGuard;

#[cfg(feature = "trace")]
const TRACE_FILE: &str = "nbestool-trace.jsonl";

#[cfg(feature = "trace")]
fn env_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
}

/// Install the global subscriber.
///
/// With `log_dir`, events go to a JSON-lines file there at debug level and
/// the returned guard must be held until exit so the writer flushes.
/// Otherwise warnings go to stderr. `RUST_LOG` overrides either level.
#[cfg(feature = "trace")]
pub fn init_tracing(log_dir: Option<&Path>) -> Option<TraceGuard> {
    use tracing_subscriber::fmt::format::FmtSpan;

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::never(dir, TRACE_FILE);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let installed = tracing_subscriber::fmt()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_env_filter(env_filter("lex_nbest=debug"))
                .try_init()
                .is_ok();
            installed.then_some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .compact()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter("warn"))
                .try_init();
            None
        }
    }
}

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: Option<&Path>) -> Option<TraceGuard> {
    None
}
