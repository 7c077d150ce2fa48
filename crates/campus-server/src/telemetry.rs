use color_eyre::owo_colors::OwoColorize;
use std::fmt;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::Layer, layer::SubscriberExt};

/// `RUST_LOG` wins over `env_filter` when set.
pub fn get_subscriber(env_filter: &str) -> impl Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    Registry::default()
        .with(env_filter)
        .with(
            Layer::new()
                .compact()
                .with_ansi(true)
                .with_timer(CampusTimer)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .with(ErrorLayer::default())
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to set logger: {0}")]
    Logger(#[from] tracing_log::log::SetLoggerError),
    #[error("Failed to set subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// # Errors
/// Fails if a global logger or subscriber was already installed.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), TelemetryError> {
    LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

struct CampusTimer;

impl tracing_subscriber::fmt::time::FormatTime for CampusTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let datetime = chrono::Local::now().format("%H:%M:%S");
        write!(w, "{}", datetime.bright_blue())
    }
}
