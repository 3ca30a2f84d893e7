/// Logging setup.
///
/// Log output always goes to stderr: in STDIO mode stdout carries the
/// JSON-RPC stream and must stay clean.

use tracing_subscriber::EnvFilter;

use crate::core::config::LogFormat;

/// Install the global tracing subscriber.
///
/// `filter` uses `RUST_LOG` directive syntax; an unparseable directive falls
/// back to `info`. Records from the `log` crate (Actix's access logger) are
/// bridged into tracing.
pub fn init(filter: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
