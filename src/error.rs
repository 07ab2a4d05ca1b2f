use thiserror::Error;

use crate::media_clock::MediaClockError;
use crate::protocol::avbtp::AvbtpDecodeError;

/// Stream configuration errors
///
/// Raised once, when the control plane configures a stream or clock. The
/// per-packet paths never produce these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Channel count outside the supported range
    #[error("invalid channel count {count} (max {max})")]
    InvalidChannelCount {
        /// Requested channel count
        count: usize,
        /// Largest supported count
        max: usize,
    },

    /// Sample rate has no 1722 nominal-rate encoding
    #[error("unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    /// Channel map does not have one entry per stream channel
    #[error("channel map has {entries} entries for {channels} channels")]
    InvalidChannelMap {
        /// Map entries
        entries: usize,
        /// Stream channels
        channels: usize,
    },

    /// Fixed-point widths that cannot hold a wordlen
    #[error("invalid fixed-point widths: internal {internal} bits, external {external} bits")]
    InvalidFractionalBits {
        /// Internal fractional bits
        internal: u32,
        /// External fractional bits
        external: u32,
    },

    /// Gain with a zero denominator
    #[error("invalid gain {name}: denominator must be non-zero")]
    InvalidGain {
        /// Gain name
        name: &'static str,
    },

    /// VLAN identifier does not fit in 12 bits
    #[error("invalid VLAN id: {0}")]
    InvalidVlan(u16),
}

/// Errors that can occur in the 1722 audio core
#[derive(Debug, Error)]
pub enum Avb1722Error {
    /// Packet decode failure
    #[error("decode error: {0}")]
    Decode(#[from] AvbtpDecodeError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Media clock failure
    #[error("media clock error: {0}")]
    MediaClock(#[from] MediaClockError),

    /// Stream handle not known to the registry
    #[error("unknown stream: {0}")]
    UnknownStream(u32),

    /// Media clock index not initialised
    #[error("unknown media clock: {0}")]
    UnknownClock(u32),
}

impl Avb1722Error {
    /// Whether the error is a setup failure that retrying cannot fix
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MediaClock(_))
    }
}

/// Result type alias for 1722 operations
pub type Result<T> = std::result::Result<T, Avb1722Error>;
