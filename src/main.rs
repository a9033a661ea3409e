//! # GC Input
//!
//! Reads GameCube controllers through whatever USB adapter they are plugged
//! into and reports them as one normalized controller model.
//!
//! The binary runs the normalization engine against the Linux evdev input
//! layer, logs controller activity and optionally records every event to a
//! JSONL file.

use anyhow::{Context, Result};
use clap::Parser;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use gc_input::config::{Config, LoggingConfig};
use gc_input::engine::events::{Event, EventKind};
use gc_input::engine::{driver, Engine};
use gc_input::source::linux::EvdevSource;
use gc_input::telemetry::EventRecorder;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "gc-input", version, about = "Normalize GameCube controller adapters")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Tick rate in Hz (overrides the configuration file)
    #[arg(short, long, value_name = "HZ")]
    rate: Option<u32>,
}

/// Main entry point for GC Input
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (defaults when no file is given)
///    - Set up logging, to stdout or to the configured file
///    - Open the evdev source and pick up connected controllers
///
/// 2. **Main Loop**
///    - Fire engine ticks at the configured rate
///    - Log button presses and record events when telemetry is enabled
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Destroy the engine
///    - Flush the event recording
///
/// # Errors
///
/// Returns error if the configuration is invalid or the telemetry file
/// cannot be opened.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- --config config/default.toml --rate 120
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    let _log_guard = init_logging(&config.logging)?;

    info!("GC Input v{} starting...", env!("CARGO_PKG_VERSION"));

    let source = EvdevSource::from_config(&config.source);
    let mut engine = Engine::new(source, config.engine);

    for controller in engine.controllers() {
        info!(
            "Port {}: {} ({})",
            controller.port, controller.adapter_name, controller.raw_id
        );
    }
    if engine.connected_count() == 0 {
        warn!("No controllers connected yet, waiting for devices in {}", config.source.input_dir);
    }

    engine.on(EventKind::Press, |event| {
        if let Event::Press { port, button } = event {
            info!("Port {}: {} pressed", port, button.label());
        }
        Ok(())
    });

    let recorder = if config.telemetry.enabled {
        let recorder = Rc::new(RefCell::new(EventRecorder::from_config(&config.telemetry)?));
        for kind in EventKind::ALL {
            let recorder = Rc::clone(&recorder);
            engine.on(kind, move |event| {
                recorder.borrow_mut().record(event)?;
                Ok(())
            });
        }
        Some(recorder)
    } else {
        None
    };

    if engine.is_polling() {
        info!("Polling at {}Hz", config.poll.rate_hz);
    } else {
        warn!("[engine] auto_start is off, controllers will not be polled");
    }
    info!("Press Ctrl+C to exit");

    let ticks = driver::run_until(&mut engine, config.poll.rate_hz, tokio::signal::ctrl_c()).await;

    info!("Received Ctrl+C, shutting down...");
    info!("Total ticks: {}", ticks);
    engine.destroy();

    if let Some(recorder) = recorder {
        let mut recorder = recorder.borrow_mut();
        recorder.flush().context("Failed to flush event recording")?;
        info!("Recorded {} events", recorder.records());
    }

    Ok(())
}

/// Loads the configuration file (or defaults) and applies CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(rate) = args.rate {
        config.poll.rate_hz = rate;
        config.validate().context("Invalid --rate")?;
    }

    Ok(config)
}

/// Installs the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// must live until exit so buffered file output is written.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_ascii_lowercase()));

    let Some(file) = &config.file else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    };

    let path = Path::new(file);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path {} has no file name", file))?;
    std::fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
