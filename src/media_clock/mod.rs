//! Media clock recovery
//!
//! Keeps a listener's local sample clock locked to a talker's presentation
//! timeline. The FIFO layer reports timestamp observations; a periodic
//! pacing task asks for the current sample period.

mod config;
pub mod recovery;
pub mod registry;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use config::{Gain, RecoveryConfig, RecoveryConfigBuilder};
pub use recovery::{
    ClockType, MediaClockRecovery, RecoveryState, StreamObservation, nominal_wordlen,
};
pub use registry::MediaClocks;

use crate::error::ConfigError;

/// Media clock setup failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaClockError {
    /// Rate is neither a 48 kHz nor a 44.1 kHz multiple
    #[error("unsupported media clock rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    /// Recovery tuning rejected
    #[error("invalid recovery configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
