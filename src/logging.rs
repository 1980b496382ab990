//! Tracing setup for embedding hosts.
//!
//! The engine logs through `tracing` only and never installs a subscriber
//! on its own. Hosts with their own subscriber skip this; `init` is for
//! hosts and harnesses that want a sensible default.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Safe to call more than once; only the first call wins.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
