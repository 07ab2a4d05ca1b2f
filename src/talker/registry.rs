//! Talker stream registry

use std::collections::HashMap;

use super::AudioFrame;
use super::builder::TalkerStream;
use crate::error::{Avb1722Error, ConfigError, Result};
use crate::protocol::avbtp::constants::DEFAULT_VID;
use crate::ptp::PtpTranslator;
use crate::types::{StreamHandle, TalkerStreamConfig};

/// Lifecycle of an outgoing stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TalkerState {
    /// Configured, not transmitting
    #[default]
    Enabled,
    /// Frames are packed and emitted
    Streaming,
}

/// Talker-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TalkerCounters {
    /// Packets completed
    pub sent_1722: u64,
}

#[derive(Debug)]
struct Entry {
    stream: TalkerStream,
    state: TalkerState,
}

/// All outgoing streams of one talker unit
#[derive(Debug)]
pub struct Talker {
    streams: HashMap<StreamHandle, Entry>,
    vlan: u16,
    counters: TalkerCounters,
}

impl Default for Talker {
    fn default() -> Self {
        Self {
            streams: HashMap::new(),
            vlan: DEFAULT_VID,
            counters: TalkerCounters::default(),
        }
    }
}

impl Talker {
    /// Create an empty talker on the default VLAN
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, handle: StreamHandle) -> Result<&mut Entry> {
        self.streams
            .get_mut(&handle)
            .ok_or(Avb1722Error::UnknownStream(handle.0))
    }

    /// Configure (or reconfigure) a stream, leaving it enabled but idle
    ///
    /// The stream takes the talker's current VLAN.
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::Config` if the configuration is invalid.
    pub fn configure_stream(
        &mut self,
        handle: StreamHandle,
        config: TalkerStreamConfig,
    ) -> Result<()> {
        let config = TalkerStreamConfig {
            vlan: self.vlan,
            ..config
        };
        let stream = TalkerStream::new(config).inspect_err(|e| {
            tracing::warn!(stream = %handle, error = %e, "Rejected talker stream config");
        })?;

        tracing::debug!(stream = %handle, "Configured talker stream");
        self.streams.insert(
            handle,
            Entry {
                stream,
                state: TalkerState::Enabled,
            },
        );
        Ok(())
    }

    /// Begin packing frames for a stream
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownStream` if the handle is not configured.
    pub fn start_stream(&mut self, handle: StreamHandle) -> Result<()> {
        let entry = self.entry_mut(handle)?;
        entry.state = TalkerState::Streaming;
        tracing::debug!(stream = %handle, "Talker stream started");
        Ok(())
    }

    /// Stop packing frames; the partial packet is discarded
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownStream` if the handle is not configured.
    pub fn stop_stream(&mut self, handle: StreamHandle) -> Result<()> {
        let entry = self.entry_mut(handle)?;
        entry.state = TalkerState::Enabled;
        entry.stream.reset();
        tracing::debug!(stream = %handle, "Talker stream stopped");
        Ok(())
    }

    /// Remove a stream
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownStream` if the handle is not configured.
    pub fn disable_stream(&mut self, handle: StreamHandle) -> Result<()> {
        let mut entry = self
            .streams
            .remove(&handle)
            .ok_or(Avb1722Error::UnknownStream(handle.0))?;
        entry.stream.reset();
        tracing::debug!(stream = %handle, "Disabled talker stream");
        Ok(())
    }

    /// Move every stream, and any configured later, to VLAN `vid`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVlan` for an id wider than 12 bits.
    pub fn set_vlan(&mut self, vid: u16) -> Result<()> {
        if vid > 0x0FFF {
            return Err(ConfigError::InvalidVlan(vid).into());
        }
        for entry in self.streams.values_mut() {
            entry.stream.set_vlan(vid)?;
        }
        self.vlan = vid;
        Ok(())
    }

    /// Feed one frame to a stream; returns the finished packet, if any
    ///
    /// Frames for a stream that is not streaming are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownStream` if the handle is not configured.
    pub fn build<P: PtpTranslator + ?Sized>(
        &mut self,
        handle: StreamHandle,
        frame: &AudioFrame<'_>,
        translator: &P,
    ) -> Result<Option<&[u8]>> {
        let entry = self
            .streams
            .get_mut(&handle)
            .ok_or(Avb1722Error::UnknownStream(handle.0))?;
        if entry.state != TalkerState::Streaming {
            return Ok(None);
        }

        match entry.stream.build(frame, translator) {
            Some(len) => {
                self.counters.sent_1722 += 1;
                Ok(Some(&entry.stream.packet()[..len]))
            }
            None => Ok(None),
        }
    }

    /// Lifecycle state of a stream
    #[must_use]
    pub fn state(&self, handle: StreamHandle) -> Option<TalkerState> {
        self.streams.get(&handle).map(|entry| entry.state)
    }

    /// Packet builder of a stream
    #[must_use]
    pub fn stream(&self, handle: StreamHandle) -> Option<&TalkerStream> {
        self.streams.get(&handle).map(|entry| &entry.stream)
    }

    /// VLAN used for outgoing streams
    #[must_use]
    pub fn vlan(&self) -> u16 {
        self.vlan
    }

    /// Talker-wide counters
    #[must_use]
    pub fn counters(&self) -> TalkerCounters {
        self.counters
    }
}
