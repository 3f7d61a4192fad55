use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise the tracing subscriber once per process.
///
/// `RUST_LOG` wins when set; otherwise `memviz*` targets log at `info`, or at
/// `debug` when `verbose` is true. Output goes to stderr so stdout stays
/// clean for JSON.
pub fn init_logging(verbose: bool) {
    INIT.call_once(|| {
        let level = if verbose { "debug" } else { "info" };
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "memviz={level},memviz_layout={level},memviz_export={level},memviz_config={level}"
            ))
        });

        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    });
}
