//! sigbyte-recv - receive one byte carried by SIGUSR1/SIGUSR2
//!
//! Prints its own pid, suspends until eight signals have arrived, then
//! prints the reconstructed value and exits.

use anyhow::{Context, Result};
use clap::Parser;
use sigbyte::{init_logging, load_link_config};
use sigbyte_host_linux::SignalReceiver;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// sigbyte-recv - Receive one byte from sigbyte-send
#[derive(Parser, Debug)]
#[command(name = "sigbyte-recv")]
#[command(about = "Receive one byte sent as SIGUSR1/SIGUSR2 signals", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/sigbyte/config.toml)
    #[arg(short, long, env = "SIGBYTE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = load_link_config(args.config.as_deref())?;

    // Handlers go in before anyone can learn our pid
    let receiver = SignalReceiver::install().context("Failed to install signal handlers")?;

    let mut stdout = io::stdout();
    if config.receiver.announce_pid {
        writeln!(stdout, "My PID is {}", receiver.pid())?;
        stdout.flush()?;
    }
    info!(pid = receiver.pid(), "Waiting for message");

    let value = receiver
        .wait_for_message()
        .context("Failed while waiting for signals")?;

    writeln!(stdout, "Received {}", value)?;
    stdout.flush()?;
    Ok(())
}
