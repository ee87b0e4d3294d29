use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Environment variable holding filter directives, e.g. `quickdraw=debug`
pub const LOG_ENV: &str = "QUICKDRAW_LOG";

pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Append plain-text logs to `path`. The terminal belongs to the UI, so
/// nothing is ever written to stdout.
pub fn init(path: &Path, default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(Arc::new(file));

    Registry::default()
        .with(env_filter(default_level))
        .with(file_layer)
        .try_init()?;

    Ok(())
}
