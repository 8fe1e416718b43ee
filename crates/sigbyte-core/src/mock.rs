//! In-process channel for testing
//!
//! Delivers straight into registered `MaskedDispatcher`s, so it keeps the
//! hazards of the real signal channel: a receiver that is blocked or busy
//! holds at most one pending notification per kind. It deliberately has no
//! queue.

use sigbyte_util::PeerId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{BitSymbol, ChannelError, ChannelResult, Delivery, MaskedDispatcher, NotificationChannel};

#[derive(Default)]
struct LoopbackState {
    peers: HashMap<PeerId, Arc<MaskedDispatcher>>,
    log: Vec<(PeerId, BitSymbol, Delivery)>,
    remaining_before_failure: Option<usize>,
}

/// Loopback notification channel between in-process peers
#[derive(Default)]
pub struct LoopbackChannel {
    state: Mutex<LoopbackState>,
}

impl LoopbackChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `dispatcher` reachable as `peer`
    pub fn register(&self, peer: PeerId, dispatcher: Arc<MaskedDispatcher>) {
        self.lock().peers.insert(peer, dispatcher);
    }

    /// Simulate the peer process exiting
    pub fn unregister(&self, peer: PeerId) {
        self.lock().peers.remove(&peer);
    }

    /// Let `count` more notifications through, then fail every delivery as
    /// if all peers had vanished
    pub fn fail_after(&self, count: usize) {
        self.lock().remaining_before_failure = Some(count);
    }

    /// Every notification sent so far, with what the receiver did with it
    pub fn log(&self) -> Vec<(PeerId, BitSymbol, Delivery)> {
        self.lock().log.clone()
    }

    /// Symbols sent so far, in sending order
    pub fn sent_symbols(&self) -> Vec<BitSymbol> {
        self.lock().log.iter().map(|(_, symbol, _)| *symbol).collect()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationChannel for LoopbackChannel {
    fn probe(&self, peer: PeerId) -> ChannelResult<()> {
        if self.lock().peers.contains_key(&peer) {
            Ok(())
        } else {
            Err(ChannelError::NoSuchPeer(peer))
        }
    }

    fn notify(&self, peer: PeerId, symbol: BitSymbol) -> ChannelResult<()> {
        let dispatcher = {
            let mut state = self.lock();
            if let Some(remaining) = state.remaining_before_failure.as_mut() {
                if *remaining == 0 {
                    return Err(ChannelError::NoSuchPeer(peer));
                }
                *remaining -= 1;
            }
            state
                .peers
                .get(&peer)
                .cloned()
                .ok_or(ChannelError::NoSuchPeer(peer))?
        };

        // Delivered without holding the channel lock: the handler may run here
        let outcome = dispatcher.deliver(symbol);
        self.lock().log.push((peer, symbol, outcome));
        Ok(())
    }
}
