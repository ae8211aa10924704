//! Tracing setup.
//!
//! The terminal belongs to the UI, so logs only go to a file.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "GLIMMER_LOG";

/// Install a file subscriber if a log file was requested.
pub fn init(log_file: Option<&Path>) -> color_eyre::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file = File::create(path)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;
    Ok(())
}
