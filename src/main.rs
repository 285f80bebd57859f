//! Cardiorenal: CVD risk estimation for CKD patients.
//!
//! Main entry point for the terminal application.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorenal::adapters::sanitize::SanitizingMakeWriter;
use cardiorenal::config::AppConfig;
use cardiorenal::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // Logs written to the terminal would corrupt the TUI (alternate screen):
    // - interactive TTY: log to a file
    // - non-interactive: log to stdout
    let interactive = std::io::stdout().is_terminal();

    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces as the open error below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Failed to open log file {:?}", config.log_file))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(SanitizingMakeWriter::with_limit(writer, config.sanitize_max_bytes)),
        )
        .init();

    tracing::info!("Starting Cardiorenal...");
    if config.allow_unsigned_models {
        tracing::warn!("Unsigned model bundles are allowed; do not use this setting in production");
    }

    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("Cardiorenal shutdown complete.");
    Ok(())
}
