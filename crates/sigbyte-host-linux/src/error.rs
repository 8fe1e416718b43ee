//! Errors from the Linux host adapter

use nix::errno::Errno;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("A signal receiver is already installed in this process")]
    AlreadyInstalled,

    #[error("Signal setup failed: {0}")]
    Signal(#[from] Errno),
}

pub type HostResult<T> = Result<T, HostError>;
