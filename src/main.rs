//! Flip-dot clock
//!
//! Drives a flip-dot sign over a serial port, or a simulated panel for development.
//!
//! # Usage
//!
//! ```bash
//! # Run the clock on the configured sign
//! flipdot-clock clock --config flipdot.toml
//!
//! # Run against a simulated panel, showing seconds
//! flipdot-clock clock --simulate --seconds
//!
//! # Show fixed text once
//! flipdot-clock text "Hello There" --config flipdot.toml
//!
//! # Print the default configuration
//! flipdot-clock config > flipdot.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use flipdot_clock::config::{AppConfig, Transport};
use flipdot_clock::sink::{error_channel, DisplaySink, ErrorEvents, PanelMonitor, Readiness, SimulatedPanel};
use flipdot_clock::{show_text, RefreshScheduler, ScheduleHandle, SystemClock};

#[cfg(feature = "serial")]
use flipdot_clock::sink::{LineEncoder, PortConfig, SerialSink};

/// Flip-dot clock
///
/// Keeps a flip-dot sign showing the current time
#[derive(Parser)]
#[command(name = "flipdot-clock")]
#[command(version)]
#[command(about = "Periodic clock refresh for flip-dot signs")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current time, refreshing until interrupted
    Clock {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show seconds (overrides the configuration)
        #[arg(short, long)]
        seconds: bool,

        /// Use a simulated panel instead of the configured transport
        #[arg(long)]
        simulate: bool,
    },

    /// Show fixed text once
    Text {
        /// Text to display
        text: String,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use a simulated panel instead of the configured transport
        #[arg(long)]
        simulate: bool,
    },

    /// Print the default configuration
    Config,
}

/// An opened display sink plus what the CLI needs to observe it
struct OpenedSink {
    sink: Box<dyn DisplaySink>,
    readiness: Readiness,
    monitor: Option<PanelMonitor>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Clock {
            config,
            seconds,
            simulate,
        } => run_clock(config.as_deref(), seconds, simulate).await,
        Commands::Text {
            text,
            config,
            simulate,
        } => run_text(&text, config.as_deref(), simulate).await,
        Commands::Config => {
            let content = AppConfig::default().to_toml_string()?;
            print!("{}", content);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, simulate: bool) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AppConfig::default(),
    };

    if simulate {
        config.panel.transport = Transport::Simulated;
    }
    config.validate()?;
    Ok(config)
}

fn open_sink(config: &AppConfig) -> Result<OpenedSink> {
    match config.panel.transport {
        Transport::Simulated => {
            let (mut panel, readiness) = SimulatedPanel::open(config.panel.clone());
            if let Some(path) = &config.simulator.frame_log {
                panel = panel
                    .with_frame_log(path)
                    .with_context(|| format!("Failed to open frame log {}", path.display()))?;
            }
            let monitor = panel.monitor();
            Ok(OpenedSink {
                sink: Box::new(panel),
                readiness,
                monitor: Some(monitor),
            })
        }

        #[cfg(feature = "serial")]
        Transport::Serial => {
            let port = PortConfig::from_panel(&config.panel);
            let (sink, readiness) = SerialSink::open(port, config.panel.clone(), LineEncoder);
            Ok(OpenedSink {
                sink: Box::new(sink),
                readiness,
                monitor: None,
            })
        }

        #[cfg(not(feature = "serial"))]
        Transport::Serial => {
            anyhow::bail!(
                "Serial transport for {} requires building with --features serial (or pass --simulate)",
                config.panel.port
            )
        }
    }
}

fn print_banner(title: &str, config: &AppConfig) {
    println!("{}", "=".repeat(60));
    println!("{}", title.cyan().bold());
    println!("{}", "=".repeat(60));
    println!("  Transport: {}", config.panel.transport);
    println!("  Port: {} (address {})", config.panel.port, config.panel.address);
    println!(
        "  Panel: {}x{} dots",
        config.panel.total_columns(),
        config.panel.rows
    );
    println!("  Font: {}, offset {}", config.clock.font, config.clock.offset);
    println!("{}", "=".repeat(60));
}

async fn run_clock(path: Option<&Path>, seconds: bool, simulate: bool) -> Result<()> {
    let mut config = load_config(path, simulate)?;
    if seconds {
        config.clock.show_seconds = true;
    }

    let display = config.display();
    let interval = config.interval()?;
    let formatter = config.format_policy()?.formatter()?;

    print_banner("Flip-dot Clock", &config);
    println!(
        "{} Refreshing every {:?}, press Ctrl+C to stop",
        "[*]".cyan().bold(),
        interval.as_duration()
    );

    let (reporter, mut events) = error_channel();
    let opened = open_sink(&config)?;

    let handle = RefreshScheduler::new(opened.sink, SystemClock::new(), formatter)
        .with_initial_fill(config.clock.initial_fill)
        .with_error_reporter(reporter)
        .start(opened.readiness, display, interval);

    let interrupted = wait_for_interrupt(&mut events, &handle).await?;

    let stats = handle.stats();
    handle.shutdown().await?;
    if !interrupted {
        anyhow::bail!("Refresh scheduler exited: the display never became ready");
    }

    println!();
    println!("{}", "Refresh Summary".white().bold());
    println!("  Ticks: {}", stats.ticks);
    println!("  Renders: {}", stats.renders.to_string().green());
    println!("  Unchanged: {}", stats.unchanged);
    println!(
        "  Failures: {} format, {} transport",
        stats.format_failures.to_string().yellow(),
        stats.transport_failures.to_string().red()
    );
    if let Some(text) = opened.monitor.and_then(|m| m.current_text()) {
        println!("  Panel shows: {}", text.white().bold());
    }

    Ok(())
}

/// Print reported errors until Ctrl+C or until the scheduler exits.
///
/// Returns `true` when interrupted.
async fn wait_for_interrupt<S>(events: &mut ErrorEvents, handle: &ScheduleHandle<S>) -> Result<bool> {
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl+C")?;
                println!("\n{} Interrupted", "[*]".cyan().bold());
                return Ok(true);
            }
            Some(err) = events.recv() => {
                eprintln!("{} {}", "[ERROR]".red().bold(), err);
            }
            _ = handle.finished() => {
                for err in events.drain() {
                    eprintln!("{} {}", "[ERROR]".red().bold(), err);
                }
                return Ok(false);
            }
        }
    }
}

async fn run_text(text: &str, path: Option<&Path>, simulate: bool) -> Result<()> {
    let config = load_config(path, simulate)?;
    print_banner("Flip-dot Text", &config);

    let mut opened = open_sink(&config)?;

    show_text(
        opened.sink.as_mut(),
        &mut opened.readiness,
        text,
        &config.display(),
        config.clock.initial_fill,
    )
    .await
    .context("Failed to display text")?;

    println!("{} Displayed {}", "[OK]".green().bold(), text.white().bold());
    if let Some(frame) = opened.monitor.and_then(|m| m.last_frame()) {
        println!(
            "  Frame #{} at {}",
            frame.sequence,
            frame.timestamp.format("%H:%M:%S")
        );
    }
    Ok(())
}
