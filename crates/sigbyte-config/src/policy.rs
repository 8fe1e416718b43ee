//! Validated link configuration

use crate::schema::RawConfig;
use std::time::Duration;

/// Default pause between two symbols
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Validated configuration ready for use by the sender and receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    pub sender: SenderConfig,
    pub receiver: ReceiverConfig,
}

/// Sender settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderConfig {
    /// Pause after each symbol. A heuristic against coalescing, not a guarantee.
    pub pacing: Duration,
}

/// Receiver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    pub announce_pid: bool,
}

impl LinkConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            sender: SenderConfig {
                pacing: raw
                    .sender
                    .pacing_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_PACING),
            },
            receiver: ReceiverConfig {
                announce_pid: raw.receiver.announce_pid.unwrap_or(true),
            },
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            sender: SenderConfig {
                pacing: DEFAULT_PACING,
            },
            receiver: ReceiverConfig { announce_pid: true },
        }
    }
}
