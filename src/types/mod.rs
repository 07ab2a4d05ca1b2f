//! Core types module

mod config;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{
    ListenerStreamConfig, SampleFormat, StreamFormat, TalkerStreamConfig, TalkerStreamConfigBuilder,
};

/// 48-bit IEEE 802 MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Copy from the first six bytes of `bytes`
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than six bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut mac = [0; 6];
        mac.copy_from_slice(&bytes[..6]);
        Self(mac)
    }

    /// Raw octets
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Group (multicast) bit
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

/// Handle the control plane uses to address one configured stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamHandle(pub u32);

impl fmt::Display for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of an audio output sink (one FIFO per channel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SinkId(pub u32);

/// Payload channel index to output sink
///
/// Unmapped entries drop their channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMap(Vec<Option<SinkId>>);

impl ChannelMap {
    /// Map built from explicit entries
    #[must_use]
    pub fn new(entries: Vec<Option<SinkId>>) -> Self {
        Self(entries)
    }

    /// Map from control-plane integers, negative meaning unmapped
    #[must_use]
    pub fn from_raw(raw: &[i32]) -> Self {
        Self(raw.iter().map(|&v| u32::try_from(v).ok().map(SinkId)).collect())
    }

    /// Channel `i` to sink `i` for `count` channels
    #[must_use]
    pub fn identity(count: usize) -> Self {
        Self(
            (0..count)
                .map(|i| u32::try_from(i).ok().map(SinkId))
                .collect(),
        )
    }

    /// Sink for a payload channel, `None` when unmapped or out of range
    #[must_use]
    pub fn sink(&self, channel: usize) -> Option<SinkId> {
        self.0.get(channel).copied().flatten()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mapped `(channel, sink)` pairs among the first `channels` entries
    pub fn mapped(&self, channels: usize) -> impl Iterator<Item = (usize, SinkId)> + '_ {
        self.0
            .iter()
            .take(channels)
            .enumerate()
            .filter_map(|(channel, sink)| sink.map(|s| (channel, s)))
    }
}
