//! Watch a path and print one line per filesystem change.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use pollwatch::{DEFAULT_CHANNEL_CAPACITY, Watcher, WatcherConfig};
use tracing::info;

/// Print filesystem changes detected by polling.
#[derive(Debug, Parser)]
#[command(name = "pollwatch-dump")]
struct Cli {
    /// Directory or file to watch.
    path: PathBuf,

    /// Poll interval in milliseconds.
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Event channel capacity.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    capacity: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = WatcherConfig::new(Duration::from_millis(cli.interval_ms))
        .with_channel_capacity(cli.capacity);
    let (watcher, mut events) = Watcher::with_config(&cli.path, config)?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                watcher.stop().await;
                break;
            }
            event = events.recv() => match event {
                Some(event) => println!("{} {}", event.path().display(), event.kind()),
                None => break,
            },
        }
    }

    if let Some(err) = watcher.scan_failure().await {
        return Err(err.into());
    }
    Ok(())
}
