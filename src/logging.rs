use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Where log output goes
/// The terminal belongs to the UI, so interactive runs only log to a file.
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Off,
}

/// Install the global logger
/// `log` records are picked up through the subscriber's log bridge.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG);

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow!("Failed to install logger: {}", e))
        }
        LogTarget::Stderr => builder
            .with_max_level(tracing_subscriber::filter::LevelFilter::INFO)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow!("Failed to install logger: {}", e)),
        LogTarget::Off => Ok(()),
    }
}
