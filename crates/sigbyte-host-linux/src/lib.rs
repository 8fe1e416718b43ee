//! Linux host adapter for sigbyte
//!
//! Provides:
//! - Symbol delivery with `kill(2)`: SIGUSR1 for ZERO, SIGUSR2 for ONE
//! - Zero-effect liveness probing (signal 0)
//! - A receiver whose handler runs with both signals masked, woken by
//!   `sigsuspend(2)` instead of polling

mod error;
mod process;
mod receiver;

pub use error::*;
pub use process::*;
pub use receiver::*;
