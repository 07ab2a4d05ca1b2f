//! AAF format-specific word
//!
//! ```text
//! 31       24 23  20 19 18 17         8 7        0
//! |  format  | nsr  | rsv |  channels  | bit depth |
//! ```

use super::constants::AAF_FORMAT_INT_32BIT;

/// Nominal sample rate codes (IEEE 1722-2016 table 7-4)
const NSR_TABLE: [(u8, u32); 10] = [
    (0x1, 8_000),
    (0x2, 16_000),
    (0x3, 32_000),
    (0x4, 44_100),
    (0x5, 48_000),
    (0x6, 88_200),
    (0x7, 96_000),
    (0x8, 176_400),
    (0x9, 192_000),
    (0xA, 24_000),
];

/// Sample rate for a nominal sample rate code, 0 when the code is unknown
#[must_use]
pub fn rate_for_nsr(nsr: u8) -> u32 {
    NSR_TABLE
        .iter()
        .find(|(code, _)| *code == nsr)
        .map_or(0, |(_, rate)| *rate)
}

/// Nominal sample rate code for a sample rate
#[must_use]
pub fn nsr_for_rate(rate: u32) -> Option<u8> {
    NSR_TABLE
        .iter()
        .find(|(_, r)| *r == rate)
        .map(|(code, _)| *code)
}

/// Decoded AAF format-specific fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AafFormat {
    /// Sample format (bits 31-24)
    pub format: u8,
    /// Nominal sample rate code (bits 23-20)
    pub nsr: u8,
    /// Channels per frame (bits 17-8)
    pub channels_per_frame: u16,
    /// Significant bits per sample (bits 7-0)
    pub bit_depth: u8,
}

impl AafFormat {
    /// 32-bit integer samples at `nsr` with `channels` per frame
    #[must_use]
    pub fn int32(nsr: u8, channels: u16) -> Self {
        Self {
            format: AAF_FORMAT_INT_32BIT,
            nsr,
            channels_per_frame: channels,
            bit_depth: 32,
        }
    }

    /// Decode from the header's format-specific word
    #[must_use]
    pub fn from_word(word: u32) -> Self {
        Self {
            format: (word >> 24) as u8,
            nsr: ((word >> 20) & 0x0F) as u8,
            channels_per_frame: ((word >> 8) & 0x03FF) as u16,
            bit_depth: (word & 0xFF) as u8,
        }
    }

    /// Encode into a format-specific word
    #[must_use]
    pub fn to_word(&self) -> u32 {
        (u32::from(self.format) << 24)
            | (u32::from(self.nsr & 0x0F) << 20)
            | (u32::from(self.channels_per_frame & 0x03FF) << 8)
            | u32::from(self.bit_depth)
    }

    /// Sample rate this format announces, 0 if unknown
    #[must_use]
    pub fn rate(&self) -> u32 {
        rate_for_nsr(self.nsr)
    }
}
