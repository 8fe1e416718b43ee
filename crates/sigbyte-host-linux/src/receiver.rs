//! Signal-driven receiver
//!
//! The handler is the only writer of the accumulator. It is installed with
//! both SIGUSR1 and SIGUSR2 in its `sa_mask`, so a signal arriving while it
//! runs stays pending until it returns instead of nesting.
//!
//! Outside of `sigsuspend` both signals are blocked in the receiving thread.
//! The handler therefore only ever runs inside the suspension point, and
//! checking for completion then suspending again cannot miss a wakeup.

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet};
use nix::libc;
use nix::unistd::getpid;
use sigbyte_core::{Accumulator, AtomicAccumulator};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::{signal_symbol, HostError, HostResult, ONE_SIGNAL, ZERO_SIGNAL};

/// Process-wide receive state; reset only by process start
static ACCUMULATOR: AtomicAccumulator = AtomicAccumulator::new();

static INSTALLED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_notification(signo: libc::c_int) {
    // Async-signal context: no allocation, no locking, no logging
    if let Some(symbol) = signal_symbol(signo) {
        ACCUMULATOR.apply(symbol);
    }
}

/// Both notification kinds
fn notification_set() -> SigSet {
    let mut set = SigSet::empty();
    set.add(ZERO_SIGNAL);
    set.add(ONE_SIGNAL);
    set
}

/// Receiving end of the link, bound to the calling thread.
///
/// Install it from the main thread before spawning any other thread: new
/// threads inherit the blocked mask, and a thread that does not block the
/// signals could otherwise take a process-directed notification. The type is
/// `!Send` so it cannot leave the thread whose mask it set up.
#[derive(Debug)]
pub struct SignalReceiver {
    wait_mask: SigSet,
    _thread_bound: PhantomData<*const ()>,
}

impl SignalReceiver {
    /// Block both signals in this thread and install the handler.
    ///
    /// Signals sent before this returns are lost or kill the process; the
    /// peer must learn our pid only afterwards.
    pub fn install() -> HostResult<Self> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(HostError::AlreadyInstalled);
        }

        let kinds = notification_set();
        let mut wait_mask = SigSet::thread_get_mask()?;
        kinds.thread_block()?;

        let action = SigAction::new(
            SigHandler::Handler(handle_notification),
            SaFlags::empty(),
            kinds,
        );
        // SAFETY: the handler only touches an atomic and calls no
        // async-signal-unsafe functions
        unsafe {
            sigaction(ZERO_SIGNAL, &action)?;
            sigaction(ONE_SIGNAL, &action)?;
        }

        wait_mask.remove(ZERO_SIGNAL);
        wait_mask.remove(ONE_SIGNAL);

        debug!("Signal handlers installed");
        Ok(Self {
            wait_mask,
            _thread_bound: PhantomData,
        })
    }

    /// Our own process id, to be handed to the sender
    pub fn pid(&self) -> i32 {
        getpid().as_raw()
    }

    /// Symbols received so far
    pub fn progress(&self) -> Accumulator {
        ACCUMULATOR.load()
    }

    /// Suspend until at least one handler invocation has completed
    pub fn wait_for_symbol(&self) -> HostResult<Accumulator> {
        self.suspend()?;
        Ok(self.progress())
    }

    /// Suspend repeatedly until the eighth symbol has arrived.
    ///
    /// Never returns if a symbol was lost to coalescing: the receiver has no
    /// way to notice that.
    pub fn wait_for_message(&self) -> HostResult<u8> {
        let mut last = self.progress();
        loop {
            if let Some(value) = last.value() {
                info!(value, "Message complete");
                return Ok(value);
            }

            let now = self.wait_for_symbol()?;
            if now != last {
                debug!(
                    bits_received = now.bits_received(),
                    partial = now.partial_value(),
                    "Symbol received"
                );
            }
            last = now;
        }
    }

    fn suspend(&self) -> HostResult<()> {
        // Returns once a handler has run; EINTR is reported as success
        self.wait_mask.suspend().map_err(Into::into)
    }
}
