//! Shared utilities for sigbyte
//!
//! This crate provides:
//! - The peer identity type (`PeerId`) and its parsing rules
//! - Default paths for the configuration file

mod ids;
mod paths;

pub use ids::*;
pub use paths::*;
