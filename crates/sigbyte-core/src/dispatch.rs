//! Threaded receiver with signal-mask semantics
//!
//! `MaskedDispatcher` reproduces what the kernel does for a handler installed
//! with both notification kinds in its mask:
//! - while the handler runs, or while delivery is blocked, arrivals become
//!   pending instead of running the handler
//! - each kind has room for one pending notification; a second arrival of
//!   the same kind is absorbed (coalesced)
//! - pending notifications are handled after the running handler returns,
//!   lower kind first, never nested inside it

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::{Accumulator, BitSymbol, ReceiveState};

/// Hook run inside the handler context after each symbol is applied
pub type HandlerHook = Box<dyn Fn(&MaskedDispatcher, BitSymbol, Accumulator) + Send + Sync>;

/// What happened to one delivered notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The handler ran for it before `deliver` returned
    Handled,
    /// Held pending until the handler returns or delivery is unblocked
    Deferred,
    /// A notification of the same kind was already pending; this one is lost
    Coalesced,
}

/// Capacity-one-per-kind pending set
#[derive(Debug, Clone, Copy, Default)]
struct PendingSet {
    zero: bool,
    one: bool,
}

impl PendingSet {
    /// Returns false if the kind was already pending
    fn insert(&mut self, symbol: BitSymbol) -> bool {
        let slot = match symbol {
            BitSymbol::Zero => &mut self.zero,
            BitSymbol::One => &mut self.one,
        };
        !std::mem::replace(slot, true)
    }

    fn take_next(&mut self) -> Option<BitSymbol> {
        if std::mem::take(&mut self.zero) {
            Some(BitSymbol::Zero)
        } else if std::mem::take(&mut self.one) {
            Some(BitSymbol::One)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct DispatchState {
    accumulator: Accumulator,
    pending: PendingSet,
    blocked: bool,
    in_handler: bool,
    applied: Vec<BitSymbol>,
    coalesced: u32,
}

/// Receiver state owned by one dispatcher, updated only from its handler
pub struct MaskedDispatcher {
    state: Mutex<DispatchState>,
    progressed: Condvar,
    hook: Option<HandlerHook>,
}

impl MaskedDispatcher {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DispatchState::default()),
            progressed: Condvar::new(),
            hook: None,
        }
    }

    /// Run `hook` inside the handler after every applied symbol.
    ///
    /// A `deliver` call made from the hook arrives while the handler is
    /// running and is therefore deferred.
    pub fn with_hook(
        hook: impl Fn(&MaskedDispatcher, BitSymbol, Accumulator) + Send + Sync + 'static,
    ) -> Self {
        Self {
            hook: Some(Box::new(hook)),
            ..Self::new()
        }
    }

    /// A notification arrives
    pub fn deliver(&self, symbol: BitSymbol) -> Delivery {
        {
            let mut state = self.lock();
            if state.blocked || state.in_handler {
                return if state.pending.insert(symbol) {
                    trace!(symbol = %symbol, "Notification pending");
                    Delivery::Deferred
                } else {
                    state.coalesced += 1;
                    debug!(symbol = %symbol, "Notification coalesced with pending one");
                    Delivery::Coalesced
                };
            }
            state.in_handler = true;
        }

        self.run_handler(symbol);
        self.drain_pending();
        Delivery::Handled
    }

    /// Hold arrivals pending, like adding both kinds to the signal mask
    pub fn block(&self) {
        self.lock().blocked = true;
    }

    /// Lift the block and handle whatever became pending meanwhile
    pub fn unblock(&self) {
        {
            let mut state = self.lock();
            state.blocked = false;
            if state.in_handler {
                return;
            }
            state.in_handler = true;
        }
        self.drain_pending();
    }

    pub fn accumulator(&self) -> Accumulator {
        self.lock().accumulator
    }

    pub fn state(&self) -> ReceiveState {
        self.accumulator().state()
    }

    /// Symbols in the order the handler applied them
    pub fn applied(&self) -> Vec<BitSymbol> {
        self.lock().applied.clone()
    }

    /// Notifications lost to coalescing so far
    pub fn coalesced(&self) -> u32 {
        self.lock().coalesced
    }

    /// Block until the eighth symbol has been applied
    pub fn wait_for_message(&self) -> u8 {
        let mut state = self.lock();
        loop {
            if let Some(value) = state.accumulator.value() {
                return value;
            }
            state = self
                .progressed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `wait_for_message`, giving up after `timeout`.
    ///
    /// Returns `None` if the message is still incomplete, which is what a
    /// lost symbol looks like from the receiving side.
    pub fn wait_for_message_timeout(&self, timeout: Duration) -> Option<u8> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let Some(value) = state.accumulator.value() {
                return Some(value);
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            state = self
                .progressed
                .wait_timeout(state, remaining)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }

    fn run_handler(&self, symbol: BitSymbol) {
        let snapshot = {
            let mut state = self.lock();
            state.accumulator = state.accumulator.push(symbol);
            state.applied.push(symbol);
            state.accumulator
        };

        debug!(
            symbol = %symbol,
            bits_received = snapshot.bits_received(),
            "Symbol applied"
        );

        if let Some(hook) = &self.hook {
            hook(self, symbol, snapshot);
        }

        self.progressed.notify_all();
    }

    /// Called with `in_handler` set; clears it once nothing is left to run
    fn drain_pending(&self) {
        loop {
            let next = {
                let mut state = self.lock();
                let next = if state.blocked {
                    None
                } else {
                    state.pending.take_next()
                };
                if next.is_none() {
                    state.in_handler = false;
                }
                next
            };

            match next {
                Some(symbol) => self.run_handler(symbol),
                None => return,
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MaskedDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols_msb_first;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use BitSymbol::{One as B, Zero as A};

    #[test]
    fn in_order_delivery_reconstructs_value() {
        let dispatcher = MaskedDispatcher::new();
        for symbol in symbols_msb_first(169) {
            assert_eq!(dispatcher.deliver(symbol), Delivery::Handled);
        }
        assert_eq!(dispatcher.state(), ReceiveState::Done { value: 169 });
        assert_eq!(dispatcher.wait_for_message(), 169);
    }

    #[test]
    fn arrival_during_handler_is_applied_after_it() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_in_hook = fired.clone();

        let dispatcher = MaskedDispatcher::with_hook(move |d, symbol, snapshot| {
            if fired_in_hook.swap(true, Ordering::SeqCst) {
                return;
            }
            assert_eq!(symbol, B);

            // Overlapping arrival: must not run inside this handler
            assert_eq!(d.deliver(A), Delivery::Deferred);
            assert_eq!(d.accumulator(), snapshot);
            assert_eq!(d.accumulator().bits_received(), 1);
        });

        assert_eq!(dispatcher.deliver(B), Delivery::Handled);

        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(dispatcher.applied(), vec![B, A]);
        assert_eq!(dispatcher.accumulator().bits_received(), 2);
        assert_eq!(dispatcher.accumulator().partial_value(), 0b10);
    }

    #[test]
    fn same_kind_while_blocked_is_coalesced() {
        let dispatcher = MaskedDispatcher::new();
        dispatcher.block();

        assert_eq!(dispatcher.deliver(B), Delivery::Deferred);
        assert_eq!(dispatcher.deliver(B), Delivery::Coalesced);
        assert_eq!(dispatcher.accumulator().bits_received(), 0);

        dispatcher.unblock();
        assert_eq!(dispatcher.applied(), vec![B]);
        assert_eq!(dispatcher.coalesced(), 1);
    }

    #[test]
    fn pending_kinds_drain_lower_kind_first() {
        let dispatcher = MaskedDispatcher::new();
        dispatcher.block();
        dispatcher.deliver(B);
        dispatcher.deliver(A);
        dispatcher.unblock();

        // Arrival order B, A is not preserved across kinds
        assert_eq!(dispatcher.applied(), vec![A, B]);
    }

    #[test]
    fn incomplete_message_times_out() {
        let dispatcher = MaskedDispatcher::new();
        dispatcher.deliver(A);
        assert_eq!(
            dispatcher.wait_for_message_timeout(Duration::from_millis(10)),
            None
        );
    }

    #[test]
    fn waiter_wakes_on_completion_from_other_thread() {
        let dispatcher = Arc::new(MaskedDispatcher::new());
        let sender = dispatcher.clone();

        let handle = std::thread::spawn(move || {
            for symbol in symbols_msb_first(42) {
                sender.deliver(symbol);
            }
        });

        assert_eq!(
            dispatcher.wait_for_message_timeout(Duration::from_secs(5)),
            Some(42)
        );
        handle.join().unwrap();
    }
}
