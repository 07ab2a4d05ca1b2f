use serde::{Deserialize, Serialize};

use super::{ChannelMap, MacAddress};
use crate::error::ConfigError;
use crate::protocol::avbtp::constants::{
    DEFAULT_PRESENTATION_DELAY_NS, DEFAULT_VID, MAX_CHANNELS_PER_STREAM, PACKET_RATE,
};
use crate::protocol::avbtp::nsr_for_rate;

/// Payload format of a listener stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamFormat {
    /// AVTP audio format
    #[default]
    Aaf,
    /// IEC 61883-6 AM824 over 1722
    Iec61883_6,
    /// Clock reference format, timestamps only
    Crf,
}

/// Sample encoding on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// 32-bit integer, one quadlet per sample
    #[default]
    Int32,
}

/// Configuration for one incoming stream
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerStreamConfig {
    /// Payload format
    pub format: StreamFormat,

    /// Channels the control plane expects in the payload
    pub num_channels: usize,

    /// Payload channel to sink
    pub map: ChannelMap,
}

impl ListenerStreamConfig {
    /// AAF stream with `num_channels` channels and the given map
    #[must_use]
    pub fn aaf(num_channels: usize, map: ChannelMap) -> Self {
        Self {
            format: StreamFormat::Aaf,
            num_channels,
            map,
        }
    }

    /// Set format
    #[must_use]
    pub fn format(mut self, format: StreamFormat) -> Self {
        self.format = format;
        self
    }

    /// Check channel count and map size
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidChannelCount` for more than the supported
    /// number of channels, in either the count or the map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.num_channels.max(self.map.len());
        if count > MAX_CHANNELS_PER_STREAM {
            return Err(ConfigError::InvalidChannelCount {
                count,
                max: MAX_CHANNELS_PER_STREAM,
            });
        }
        Ok(())
    }
}

/// Configuration for one outgoing stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkerStreamConfig {
    /// Destination MAC, usually the stream's multicast address
    pub destination: MacAddress,

    /// Source MAC
    pub source: MacAddress,

    /// 64-bit stream id
    pub stream_id: u64,

    /// Channels in the stream
    pub num_channels: usize,

    /// Stream channel to slot in the incoming audio frame
    pub map: Vec<usize>,

    /// Sample encoding
    pub sample_format: SampleFormat,

    /// Nominal sample rate in Hz
    pub sample_rate: u32,

    /// Offset added to the translated PTP time (default: 2 ms)
    pub presentation_delay_ns: u32,

    /// VLAN identifier written into the 802.1Q tag
    pub vlan: u16,
}

impl Default for TalkerStreamConfig {
    fn default() -> Self {
        Self {
            destination: MacAddress::default(),
            source: MacAddress::default(),
            stream_id: 0,
            num_channels: 2,
            map: vec![0, 1],
            sample_format: SampleFormat::Int32,
            sample_rate: 48_000,
            presentation_delay_ns: DEFAULT_PRESENTATION_DELAY_NS,
            vlan: DEFAULT_VID,
        }
    }
}

impl TalkerStreamConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> TalkerStreamConfigBuilder {
        TalkerStreamConfigBuilder::default()
    }

    /// Audio frames accumulated into one packet at the 8 kHz packet rate
    #[must_use]
    pub fn samples_per_packet(&self) -> usize {
        self.sample_rate.div_ceil(PACKET_RATE) as usize
    }

    /// Check channel count, map and sample rate
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_channels == 0 || self.num_channels > MAX_CHANNELS_PER_STREAM {
            return Err(ConfigError::InvalidChannelCount {
                count: self.num_channels,
                max: MAX_CHANNELS_PER_STREAM,
            });
        }
        if self.map.len() != self.num_channels {
            return Err(ConfigError::InvalidChannelMap {
                entries: self.map.len(),
                channels: self.num_channels,
            });
        }
        if nsr_for_rate(self.sample_rate).is_none() {
            return Err(ConfigError::UnsupportedSampleRate(self.sample_rate));
        }
        if self.vlan > 0x0FFF {
            return Err(ConfigError::InvalidVlan(self.vlan));
        }
        Ok(())
    }
}

/// Builder for `TalkerStreamConfig`
#[derive(Debug, Clone, Default)]
pub struct TalkerStreamConfigBuilder {
    config: TalkerStreamConfig,
}

impl TalkerStreamConfigBuilder {
    /// Set destination MAC
    #[must_use]
    pub fn destination(mut self, mac: MacAddress) -> Self {
        self.config.destination = mac;
        self
    }

    /// Set source MAC
    #[must_use]
    pub fn source(mut self, mac: MacAddress) -> Self {
        self.config.source = mac;
        self
    }

    /// Set stream id
    #[must_use]
    pub fn stream_id(mut self, id: u64) -> Self {
        self.config.stream_id = id;
        self
    }

    /// Set channels, mapping channel `i` to frame slot `i`
    #[must_use]
    pub fn channels(mut self, count: usize) -> Self {
        self.config.num_channels = count;
        self.config.map = (0..count).collect();
        self
    }

    /// Set an explicit channel to frame slot map
    #[must_use]
    pub fn map(mut self, map: Vec<usize>) -> Self {
        self.config.num_channels = map.len();
        self.config.map = map;
        self
    }

    /// Set sample rate
    #[must_use]
    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Set presentation delay in nanoseconds
    #[must_use]
    pub fn presentation_delay_ns(mut self, delay: u32) -> Self {
        self.config.presentation_delay_ns = delay;
        self
    }

    /// Set VLAN id
    #[must_use]
    pub fn vlan(mut self, vlan: u16) -> Self {
        self.config.vlan = vlan;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> TalkerStreamConfig {
        self.config
    }
}
