use tracing_subscriber::{prelude::*, EnvFilter};

/// Logs go to stderr so they never mix with command output; `RUST_LOG` picks the level.
pub(crate) fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
}
