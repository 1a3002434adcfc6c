//! Shared pieces of the Ali command-line tools: the terminal host and
//! numbered session files.

pub mod host;
pub mod session;

use tracing_subscriber::EnvFilter;

/// Install the diagnostic subscriber. VM warnings are visible by
/// default; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
