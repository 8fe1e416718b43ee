//! Signal delivery to peer processes

use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use sigbyte_core::{BitSymbol, ChannelError, ChannelResult, NotificationChannel};
use sigbyte_util::PeerId;
use tracing::debug;

/// Signal that carries a ZERO symbol
pub const ZERO_SIGNAL: Signal = Signal::SIGUSR1;

/// Signal that carries a ONE symbol
pub const ONE_SIGNAL: Signal = Signal::SIGUSR2;

pub fn symbol_signal(symbol: BitSymbol) -> Signal {
    match symbol {
        BitSymbol::Zero => ZERO_SIGNAL,
        BitSymbol::One => ONE_SIGNAL,
    }
}

/// Map a raw signal number back to a symbol; async-signal-safe
pub fn signal_symbol(signo: libc::c_int) -> Option<BitSymbol> {
    match Signal::try_from(signo) {
        Ok(ZERO_SIGNAL) => Some(BitSymbol::Zero),
        Ok(ONE_SIGNAL) => Some(BitSymbol::One),
        _ => None,
    }
}

fn channel_error(peer: PeerId, errno: Errno) -> ChannelError {
    match errno {
        Errno::ESRCH => ChannelError::NoSuchPeer(peer),
        Errno::EPERM => ChannelError::PermissionDenied(peer),
        e => ChannelError::Os(e.desc().to_string()),
    }
}

/// Notification channel backed by standard (non-queuing) POSIX signals.
///
/// Standard signals keep one pending bit per signal per process; that is
/// where the coalescing hazard of the link comes from. Realtime signals
/// would queue and are intentionally not used.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalChannel;

impl SignalChannel {
    pub fn new() -> Self {
        Self
    }

    /// True if `peer` exists and may be signaled
    pub fn is_alive(&self, peer: PeerId) -> bool {
        self.probe(peer).is_ok()
    }
}

impl NotificationChannel for SignalChannel {
    fn probe(&self, peer: PeerId) -> ChannelResult<()> {
        signal::kill(Pid::from_raw(peer.as_raw()), None).map_err(|e| {
            debug!(peer = %peer, error = %e, "Liveness probe failed");
            channel_error(peer, e)
        })
    }

    fn notify(&self, peer: PeerId, symbol: BitSymbol) -> ChannelResult<()> {
        let sig = symbol_signal(symbol);
        match signal::kill(Pid::from_raw(peer.as_raw()), sig) {
            Ok(()) => {
                debug!(peer = %peer, signal = ?sig, "Signal sent");
                Ok(())
            }
            Err(e) => {
                debug!(peer = %peer, signal = ?sig, error = %e, "Failed to send signal");
                Err(channel_error(peer, e))
            }
        }
    }
}
