//! Paced sender

use sigbyte_util::PeerId;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::{symbols_msb_first, ChannelError, NotificationChannel, SYMBOLS_PER_MESSAGE};

/// Errors from sending a message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmitError {
    #[error("peer {peer} is unavailable: {source}")]
    PeerUnavailable {
        peer: PeerId,
        #[source]
        source: ChannelError,
    },

    /// Delivery of bit `bit` failed; bits above it were already sent
    #[error("failed to deliver bit {bit}: {source}")]
    Delivery {
        bit: u8,
        #[source]
        source: ChannelError,
    },
}

/// Sends one byte as eight paced notifications.
///
/// The pause after each symbol gives the receiver time to drain the previous
/// notification. It is a heuristic: a receiver that is not scheduled within
/// the interval can still see two same-kind notifications coalesce.
pub struct Transmitter<C> {
    channel: C,
    pacing: Duration,
}

impl<C: NotificationChannel> Transmitter<C> {
    pub fn new(channel: C, pacing: Duration) -> Self {
        Self { channel, pacing }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Send `value` to `peer`, most significant bit first.
    ///
    /// Aborts on the first delivery failure; nothing is retried or resumed.
    pub fn send_message(&self, peer: PeerId, value: u8) -> Result<(), TransmitError> {
        self.channel
            .probe(peer)
            .map_err(|source| TransmitError::PeerUnavailable { peer, source })?;

        info!(peer = %peer, value, "Sending message");

        for (i, symbol) in symbols_msb_first(value).enumerate() {
            let bit = SYMBOLS_PER_MESSAGE - 1 - i as u8;

            self.channel
                .notify(peer, symbol)
                .map_err(|source| TransmitError::Delivery { bit, source })?;

            debug!(peer = %peer, bit, symbol = %symbol, "Symbol sent");

            if !self.pacing.is_zero() {
                std::thread::sleep(self.pacing);
            }
        }

        info!(peer = %peer, value, "Message sent");
        Ok(())
    }
}
