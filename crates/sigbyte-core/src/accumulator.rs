//! Receive-side state machine

use std::sync::atomic::{AtomicU16, Ordering};

use crate::{BitSymbol, SYMBOLS_PER_MESSAGE};

/// Where the receiver stands in the current message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveState {
    /// Fewer than eight symbols so far
    Waiting { bits_received: u8 },
    /// Terminal: all eight symbols applied
    Done { value: u8 },
}

/// Partially received message.
///
/// The low `bits_received` bits of `result` hold the symbols seen so far,
/// first symbol highest; all bits above them are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accumulator {
    result: u8,
    bits_received: u8,
}

impl Accumulator {
    pub const fn new() -> Self {
        Self {
            result: 0,
            bits_received: 0,
        }
    }

    /// Apply one symbol. Symbols arriving after the eighth are ignored.
    #[must_use]
    pub fn push(self, symbol: BitSymbol) -> Self {
        if self.is_complete() {
            return self;
        }
        Self {
            result: (self.result << 1) | symbol.bit(),
            bits_received: self.bits_received + 1,
        }
    }

    pub fn state(&self) -> ReceiveState {
        if self.is_complete() {
            ReceiveState::Done { value: self.result }
        } else {
            ReceiveState::Waiting {
                bits_received: self.bits_received,
            }
        }
    }

    pub fn bits_received(&self) -> u8 {
        self.bits_received
    }

    /// Value built from the symbols so far
    pub fn partial_value(&self) -> u8 {
        self.result
    }

    pub fn is_complete(&self) -> bool {
        self.bits_received >= SYMBOLS_PER_MESSAGE
    }

    /// The reconstructed byte, once all eight symbols arrived
    pub fn value(&self) -> Option<u8> {
        self.is_complete().then_some(self.result)
    }

    /// Pack into one word so the state can live in a single atomic
    pub const fn to_raw(self) -> u16 {
        ((self.bits_received as u16) << 8) | self.result as u16
    }

    pub const fn from_raw(raw: u16) -> Self {
        Self {
            result: (raw & 0xff) as u8,
            bits_received: (raw >> 8) as u8,
        }
    }
}

/// Accumulator stored in one atomic word, for use from an OS signal handler.
///
/// Updates are a plain load/store pair, not a CAS loop: the only writer is
/// the handler, and the handler runs with every notification kind masked, so
/// no second update can start until the first has been stored.
#[derive(Debug)]
pub struct AtomicAccumulator(AtomicU16);

impl AtomicAccumulator {
    pub const fn new() -> Self {
        Self(AtomicU16::new(Accumulator::new().to_raw()))
    }

    /// The single mutation entry point
    pub fn apply(&self, symbol: BitSymbol) -> Accumulator {
        let next = self.load().push(symbol);
        self.0.store(next.to_raw(), Ordering::SeqCst);
        next
    }

    pub fn load(&self) -> Accumulator {
        Accumulator::from_raw(self.0.load(Ordering::SeqCst))
    }
}

impl Default for AtomicAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
