//! Notification channel interface

use sigbyte_util::PeerId;
use std::sync::Arc;
use thiserror::Error;

use crate::BitSymbol;

/// Errors from delivering a notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("no such process: {0}")]
    NoSuchPeer(PeerId),

    #[error("permission denied signaling process {0}")]
    PermissionDenied(PeerId),

    #[error("delivery failed: {0}")]
    Os(String),
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// A two-kind, payload-free, non-queuing notification channel.
///
/// Implementations must not add queuing or acknowledgement: a notification
/// of a kind that is already pending at the peer is absorbed into it.
pub trait NotificationChannel {
    /// Zero-effect liveness check of the peer
    fn probe(&self, peer: PeerId) -> ChannelResult<()>;

    /// Deliver the notification kind that stands for `symbol`
    fn notify(&self, peer: PeerId, symbol: BitSymbol) -> ChannelResult<()>;
}

impl<C: NotificationChannel + ?Sized> NotificationChannel for &C {
    fn probe(&self, peer: PeerId) -> ChannelResult<()> {
        (**self).probe(peer)
    }

    fn notify(&self, peer: PeerId, symbol: BitSymbol) -> ChannelResult<()> {
        (**self).notify(peer, symbol)
    }
}

impl<C: NotificationChannel + ?Sized> NotificationChannel for Arc<C> {
    fn probe(&self, peer: PeerId) -> ChannelResult<()> {
        (**self).probe(peer)
    }

    fn notify(&self, peer: PeerId, symbol: BitSymbol) -> ChannelResult<()> {
        (**self).notify(peer, symbol)
    }
}
