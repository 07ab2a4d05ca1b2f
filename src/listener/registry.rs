//! Listener stream registry
//!
//! Owns every configured incoming stream, keyed by the control plane's
//! handle. Reconfiguration replaces a stream's state wholesale.

use std::collections::HashMap;

use super::stream::ListenerStream;
use super::{AudioSink, PacketDisposition};
use crate::error::{Avb1722Error, Result};
use crate::types::{ChannelMap, ListenerStreamConfig, StreamHandle};

/// Listener-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerCounters {
    /// Packets handed to an active stream
    pub received_1722: u64,
    /// Packets dropped by the conformance filter
    pub rejected: u64,
}

/// All incoming streams of one listener unit
#[derive(Debug, Default)]
pub struct Listener {
    streams: HashMap<StreamHandle, ListenerStream>,
    counters: ListenerCounters,
}

impl Listener {
    /// Create an empty listener
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure (or reconfigure) a stream; any previous state is dropped
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::Config` if the configuration is invalid.
    pub fn configure_stream(
        &mut self,
        handle: StreamHandle,
        config: ListenerStreamConfig,
    ) -> Result<()> {
        if let Err(e) = config.validate() {
            tracing::warn!(stream = %handle, error = %e, "Rejected listener stream config");
            return Err(e.into());
        }

        tracing::debug!(
            stream = %handle,
            format = ?config.format,
            channels = config.num_channels,
            "Configured listener stream"
        );
        self.streams.insert(handle, ListenerStream::new(handle, config));
        Ok(())
    }

    /// Stop a stream; its packets are ignored until it is reconfigured
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownStream` if the handle is not configured.
    pub fn disable_stream(&mut self, handle: StreamHandle) -> Result<()> {
        let stream = self
            .streams
            .get_mut(&handle)
            .ok_or(Avb1722Error::UnknownStream(handle.0))?;
        stream.deactivate();
        tracing::debug!(stream = %handle, "Disabled listener stream");
        Ok(())
    }

    /// Replace a stream's channel map
    ///
    /// Treated as a stop and restart: lock and counters start over.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStream` for an unconfigured handle or `Config` for an
    /// oversized map.
    pub fn adjust_channel_map(&mut self, handle: StreamHandle, map: ChannelMap) -> Result<()> {
        let current = self
            .streams
            .get(&handle)
            .ok_or(Avb1722Error::UnknownStream(handle.0))?;
        let config = ListenerStreamConfig {
            map,
            ..current.config().clone()
        };
        self.configure_stream(handle, config)
    }

    /// Process one received frame for `handle`
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownStream` if the handle is not configured.
    /// Malformed packets are not errors; they come back as
    /// `PacketDisposition::Rejected`.
    pub fn process_packet<S: AudioSink + ?Sized>(
        &mut self,
        handle: StreamHandle,
        frame: &[u8],
        sink: &mut S,
    ) -> Result<PacketDisposition> {
        let stream = self
            .streams
            .get_mut(&handle)
            .ok_or(Avb1722Error::UnknownStream(handle.0))?;

        let disposition = stream.process_packet(frame, sink);
        match disposition {
            PacketDisposition::Inactive => {}
            PacketDisposition::Rejected(_) => {
                self.counters.received_1722 += 1;
                self.counters.rejected += 1;
            }
            _ => self.counters.received_1722 += 1,
        }
        Ok(disposition)
    }

    /// State of one stream
    #[must_use]
    pub fn stream(&self, handle: StreamHandle) -> Option<&ListenerStream> {
        self.streams.get(&handle)
    }

    /// Configured streams
    pub fn streams(&self) -> impl Iterator<Item = &ListenerStream> {
        self.streams.values()
    }

    /// Listener-wide counters
    #[must_use]
    pub fn counters(&self) -> ListenerCounters {
        self.counters
    }
}
