//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Smallest accepted inter-symbol pause
pub const MIN_PACING_MS: u64 = 1;

/// Largest accepted inter-symbol pause
pub const MAX_PACING_MS: u64 = 10_000;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("sender.pacing_ms = {value}: must be between {min} and {max}")]
    PacingOutOfRange { value: u64, min: u64, max: u64 },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(pacing_ms) = config.sender.pacing_ms {
        if let Err(e) = validate_pacing_ms(pacing_ms) {
            errors.push(e);
        }
    }

    errors
}

/// Check a pacing interval, whether it comes from a file or a CLI flag.
///
/// Zero is rejected: without any pause, repeated symbols of the same kind
/// are almost always coalesced by the kernel.
pub fn validate_pacing_ms(value: u64) -> Result<(), ValidationError> {
    if (MIN_PACING_MS..=MAX_PACING_MS).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::PacingOutOfRange {
            value,
            min: MIN_PACING_MS,
            max: MAX_PACING_MS,
        })
    }
}
