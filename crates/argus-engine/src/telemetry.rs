use std::sync::Once;

static INIT: Once = Once::new();

/// Install the global tracing subscriber. Level comes from `RUST_LOG`,
/// defaulting to `info`. Safe to call more than once; only the first call
/// installs anything.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    });
}
