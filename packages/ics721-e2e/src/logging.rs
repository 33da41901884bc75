use tracing_subscriber::{fmt, EnvFilter};

/// Installs a fmt subscriber filtered by `RUST_LOG`, `info` when unset.
/// Calling it again is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // fails only if a global subscriber is already set
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
