use std::sync::Once;

/// Initialize the global tracing subscriber once (used by tests that run with `RUST_LOG`).
///
/// This sets up logging with the RUST_LOG environment variable, but keeps the
/// HTTP client's connection logs out of test output.
pub fn init_tracing_from_env() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
        if let Ok(directive) = "ureq=warn".parse() {
            env_filter = env_filter.add_directive(directive);
        }

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stdout);
        let _ = subscriber.try_init();
    });
}
