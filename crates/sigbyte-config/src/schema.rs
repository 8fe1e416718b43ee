//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Sending side settings
    #[serde(default)]
    pub sender: RawSenderConfig,

    /// Receiving side settings
    #[serde(default)]
    pub receiver: RawReceiverConfig,
}

/// Sender settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSenderConfig {
    /// Pause after each symbol, in milliseconds (default: 100)
    pub pacing_ms: Option<u64>,
}

/// Receiver settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawReceiverConfig {
    /// Print "My PID is <pid>" once handlers are installed (default: true)
    pub announce_pid: Option<bool>,
}
