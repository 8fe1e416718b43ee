//! Core of the sigbyte link
//!
//! One byte travels between two processes as eight notifications of two
//! distinguishable kinds. This crate is platform-free:
//! - `BitSymbol` and MSB-first message decomposition
//! - `Accumulator`, the receive-side state machine
//! - `NotificationChannel`, the seam to the OS delivery facility
//! - `Transmitter`, the paced sender
//! - `MaskedDispatcher`, a threaded receiver with handler-mask semantics
//! - `LoopbackChannel`, an in-process channel that coalesces like signals do
//!
//! # Known limitation
//!
//! The channel has capacity one per kind. Two notifications of the same kind
//! that arrive before the receiver consumes the first collapse into one, and
//! every later bit is then misaligned. Neither side can detect this. The
//! sender's pacing interval makes it unlikely, not impossible.

mod accumulator;
mod channel;
mod dispatch;
mod mock;
mod symbol;
mod transmit;

pub use accumulator::*;
pub use channel::*;
pub use dispatch::*;
pub use mock::*;
pub use symbol::*;
pub use transmit::*;
