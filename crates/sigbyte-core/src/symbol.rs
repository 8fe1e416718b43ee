//! Binary symbols and message decomposition

use std::fmt;

/// Number of symbols in one message
pub const SYMBOLS_PER_MESSAGE: u8 = 8;

/// One binary symbol, carried only by which notification kind arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitSymbol {
    /// Notification kind A
    Zero,
    /// Notification kind B
    One,
}

impl BitSymbol {
    pub fn from_bit(bit: u8) -> Self {
        if bit & 1 == 0 { Self::Zero } else { Self::One }
    }

    pub fn bit(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl fmt::Display for BitSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bit())
    }
}

/// Decompose a value into its symbols, bit 7 first
pub fn symbols_msb_first(value: u8) -> impl Iterator<Item = BitSymbol> {
    (0..SYMBOLS_PER_MESSAGE)
        .rev()
        .map(move |i| BitSymbol::from_bit(value >> i))
}
