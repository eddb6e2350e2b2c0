//! Tracing setup for processes embedding the engine.
//!
//! The storage and report layers emit plain `tracing` events (rolled-back
//! transactions, degraded report fields, slow migrations). A host process
//! calls [`init_logging`] once at startup to install a global subscriber for
//! them; `RUST_LOG` overrides the configured level when set.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

/// Installs the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) {
    tracing_subscriber::registry()
        .with(format_layer(&config.format))
        .with(env_filter(&config.level))
        .init();
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// `json` for log ingestion, anything else renders for a console.
fn format_layer(format: &str) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        "json" => fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        _ => fmt::layer()
            .pretty()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Built per test instead of installed globally, so both formats can be
    // exercised in one process.
    #[test]
    fn both_formats_accept_events() {
        for format in ["json", "console"] {
            let subscriber = tracing_subscriber::registry()
                .with(format_layer(format))
                .with(env_filter("info"));
            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(format, "subscriber smoke event");
            });
        }
    }
}
