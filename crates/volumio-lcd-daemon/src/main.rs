//! Volumio LCD Daemon
//!
//! Mirrors Volumio playback state onto a character LCD: the artist and title
//! while playing, a welcome message otherwise.

mod config;
mod dispatcher;
mod volumio;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use volumio_lcd_hw::{ConsoleTransport, I2cBus, LcdController};

use config::Config;
use dispatcher::Dispatcher;
use volumio::{PlayerEvent, VolumioClient};

#[derive(Parser)]
#[command(name = "volumio-lcdd")]
#[command(about = "Shows Volumio playback state on a character LCD")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Volumio base URL, overrides the configuration file
    #[arg(long)]
    url: Option<String>,

    /// Do not acquire the I2C bus (console output only)
    #[arg(long)]
    no_bus: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path).context("Failed to load configuration")?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => Config::default(),
    };
    if let Some(url) = cli.url {
        config.volumio.url = url;
    }
    if cli.no_bus {
        config.lcd.acquire_bus = false;
    }

    // Open the display; an unavailable bus is fatal
    let geometry = config.lcd.geometry()?;
    let mut transport = ConsoleTransport::stdout();
    if config.lcd.acquire_bus {
        transport = transport.with_bus(I2cBus::new(geometry.bus(), geometry.address()));
    }
    let mut lcd = LcdController::new(geometry, transport)
        .with_idle_message(&config.display.idle_line1, &config.display.idle_line2);
    lcd.open().context("Failed to open LCD")?;

    let mut dispatcher = Dispatcher::new(lcd);
    if let Err(e) = dispatcher.show_welcome() {
        warn!("Failed to show welcome message: {}", e);
    }

    // Start the event feed
    let (event_tx, mut event_rx) = mpsc::channel::<PlayerEvent>(16);
    tokio::spawn(VolumioClient::new(config.volumio.clone(), event_tx).run());

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    // Events and shutdown are handled on this task only, so display writes never overlap
    let mut feed_open = true;
    loop {
        tokio::select! {
            event = event_rx.recv(), if feed_open => match event {
                Some(event) => {
                    if let Err(e) = dispatcher.handle(event) {
                        warn!("Display update failed: {}", e);
                    }
                }
                None => {
                    info!("Event feed ended, waiting for shutdown signal");
                    feed_open = false;
                }
            },
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    dispatcher.shutdown();
    Ok(())
}
