//! Strongly-typed identifiers for sigbyte

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a textual process id is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerIdError {
    #[error("not an integer: {0:?}")]
    Malformed(String),

    #[error("process id must be positive, got {0}")]
    NotPositive(i64),

    #[error("process id {0} does not fit a pid_t")]
    TooLarge(i64),
}

/// Operating-system process id of the remote end of a link.
///
/// Always positive: zero and negative values address process groups in
/// `kill(2)` and are never a valid single peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(i32);

impl PeerId {
    pub fn new(raw: i64) -> Result<Self, PeerIdError> {
        if raw <= 0 {
            return Err(PeerIdError::NotPositive(raw));
        }
        i32::try_from(raw)
            .map(Self)
            .map_err(|_| PeerIdError::TooLarge(raw))
    }

    pub fn as_raw(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PeerId {
    type Err = PeerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw: i64 = trimmed
            .parse()
            .map_err(|_| PeerIdError::Malformed(trimmed.to_string()))?;
        Self::new(raw)
    }
}

impl TryFrom<i64> for PeerId {
    type Error = PeerIdError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<PeerId> for i32 {
    fn from(peer: PeerId) -> Self {
        peer.0
    }
}
