use tracing_subscriber::{fmt, EnvFilter};

/// Install a compact stderr subscriber for the status lines every registry
/// operation emits. Respects `RUST_LOG`, defaults to `info`. Calling it more
/// than once is harmless.
pub fn init_logging() {
    init_logging_with("info");
}

pub fn init_logging_with(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init();
}
