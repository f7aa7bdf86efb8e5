use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise stderr logging at INFO, overridable through `RUST_LOG`.
///
/// Stdout is left free for command output such as `validate`.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init()
}
