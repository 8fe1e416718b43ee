//! sigbyte-send - transmit one byte as eight paced signals
//!
//! Asks for (or takes from flags) the receiver's pid and a value in 0..=255,
//! then sends SIGUSR1 for each ZERO bit and SIGUSR2 for each ONE bit, most
//! significant bit first.

use anyhow::{Context, Result};
use clap::Parser;
use sigbyte::{init_logging, load_link_config, parse_value, InputError, Prompter};
use sigbyte_config::validate_pacing_ms;
use sigbyte_core::Transmitter;
use sigbyte_host_linux::SignalChannel;
use sigbyte_util::PeerId;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

/// sigbyte-send - Send one byte to a sigbyte receiver
#[derive(Parser, Debug)]
#[command(name = "sigbyte-send")]
#[command(about = "Send one byte to a sigbyte receiver using SIGUSR1/SIGUSR2", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/sigbyte/config.toml)
    #[arg(short, long, env = "SIGBYTE_CONFIG")]
    config: Option<PathBuf>,

    /// Receiver PID (prompted for when omitted)
    #[arg(short, long)]
    pid: Option<PeerId>,

    /// Value to send, 0-255 (prompted for when omitted)
    #[arg(short, long, value_parser = parse_value)]
    value: Option<u8>,

    /// Pause after each signal in milliseconds, overriding the config
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn run(args: Args) -> Result<ExitCode> {
    let config = load_link_config(args.config.as_deref())?;

    let pacing = match args.pacing_ms {
        Some(ms) => {
            validate_pacing_ms(ms)?;
            Duration::from_millis(ms)
        }
        None => config.sender.pacing,
    };

    let channel = SignalChannel::new();
    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());

    let peer = match args.pid {
        Some(peer) if channel.is_alive(peer) => peer,
        Some(peer) => {
            eprintln!("{}", InputError::UnavailablePeer(peer));
            return Ok(ExitCode::from(2));
        }
        None => prompter
            .peer(|peer| channel.is_alive(peer))
            .context("Failed to read receiver PID")?,
    };

    let value = match args.value {
        Some(value) => value,
        None => prompter.value().context("Failed to read message")?,
    };

    info!(
        peer = %peer,
        value,
        pacing_ms = pacing.as_millis() as u64,
        "Transmitting"
    );

    let transmitter = Transmitter::new(channel, pacing);
    match transmitter.send_message(peer, value) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            debug!(peer = %peer, error = %e, "Transmission aborted");
            eprintln!("Failed to send signal: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
