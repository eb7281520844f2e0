use exif_renamer_core::AppConfig;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr so the rename listing on stdout stays clean.
/// `RUST_LOG` wins over the configured level.
pub fn init_logger(config: &AppConfig) {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(config.color),
        )
        .with(filter_layer)
        .init();
}
