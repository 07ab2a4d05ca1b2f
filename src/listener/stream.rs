//! Per-stream listener state and format detection

use super::sequence_tracker::SequenceTracker;
use super::{AudioSink, LOCK_THRESHOLD, PacketDisposition, StridedSamples};
use crate::protocol::avbtp::constants::{CIP_HDR_SIZE, CRF_HDR_SIZE, PACKET_RATE, SAMPLE_BYTES};
use crate::protocol::avbtp::{AafFormat, AvbtpDecodeError, AvbtpHeader, CipHeader, CrfFrame, Frame};
use crate::types::{ChannelMap, ListenerStreamConfig, StreamFormat, StreamHandle};

/// Acquisition state of a listener stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Collecting evidence about rate and geometry
    Unlocked,
    /// Geometry known, samples flow to the sinks
    Locked,
}

/// Channel/frame geometry a run of packets has to agree on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Geometry {
    /// AAF: announced channel count and rate code
    Aaf { channels: usize, nsr: u8 },
    /// 61883-6: channels inferred from payload size and DBC step
    Iec61883 { channels: usize },
}

/// Diagnostic counters for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStreamStats {
    /// Packets dropped by the conformance filter
    pub rejected: u64,
    /// Packets whose samples reached the sinks
    pub delivered: u64,
    /// Times acquisition restarted on a geometry change
    pub relocks: u64,
    /// Locked AAF packets whose channel count differs from the configured one
    pub channel_mismatches: u64,
}

/// State of one incoming stream
///
/// Owned and advanced by a single decode path; reconfiguring replaces the
/// whole value.
#[derive(Debug)]
pub struct ListenerStream {
    handle: StreamHandle,
    config: ListenerStreamConfig,
    active: bool,
    chan_lock: u32,
    geometry: Option<Geometry>,
    /// Running evidence sum during acquisition
    evidence: u32,
    rate: u32,
    frames_per_packet: usize,
    num_channels_in_payload: usize,
    prev_num_samples: usize,
    prev_dbc: Option<u8>,
    sequence: SequenceTracker,
    stats: ListenerStreamStats,
}

/// CRF carries no audio; one silent sample keeps the FIFO's timestamp
/// bookkeeping moving
const PLACEHOLDER: [u8; SAMPLE_BYTES] = [0; SAMPLE_BYTES];

/// Rate for an averaged 61883-6 samples-per-channel-per-packet count
fn rate_for_block_count(blocks: u32) -> u32 {
    match blocks {
        1 => 8_000,
        2 => 16_000,
        4 => 32_000,
        5 => 44_100,
        6 => 48_000,
        11 => 88_200,
        12 => 96_000,
        24 => 192_000,
        _ => 0,
    }
}

impl ListenerStream {
    /// New, active, unlocked stream
    #[must_use]
    pub fn new(handle: StreamHandle, config: ListenerStreamConfig) -> Self {
        Self {
            handle,
            config,
            active: true,
            chan_lock: 0,
            geometry: None,
            evidence: 0,
            rate: 0,
            frames_per_packet: 0,
            num_channels_in_payload: 0,
            prev_num_samples: 0,
            prev_dbc: None,
            sequence: SequenceTracker::new(),
            stats: ListenerStreamStats::default(),
        }
    }

    /// Control-plane handle
    #[must_use]
    pub fn handle(&self) -> StreamHandle {
        self.handle
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &ListenerStreamConfig {
        &self.config
    }

    /// Whether packets are being processed
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop processing; state is kept until the stream is reconfigured
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Acquisition state
    #[must_use]
    pub fn lock_state(&self) -> LockState {
        if self.chan_lock >= LOCK_THRESHOLD {
            LockState::Locked
        } else {
            LockState::Unlocked
        }
    }

    /// Lock acquisition counter
    #[must_use]
    pub fn chan_lock(&self) -> u32 {
        self.chan_lock
    }

    /// Detected sample rate; 0 while unlocked or when the rate is unknown
    #[must_use]
    pub fn rate(&self) -> u32 {
        if self.lock_state() == LockState::Locked {
            self.rate
        } else {
            0
        }
    }

    /// Detected frames per packet
    #[must_use]
    pub fn frames_per_packet(&self) -> usize {
        self.frames_per_packet
    }

    /// Detected channels per frame in the payload
    #[must_use]
    pub fn num_channels_in_payload(&self) -> usize {
        self.num_channels_in_payload
    }

    /// Sequence number of the last accepted packet
    #[must_use]
    pub fn last_sequence(&self) -> Option<u8> {
        self.sequence.last_sequence()
    }

    /// Sequence continuity tracker
    #[must_use]
    pub fn sequence(&self) -> &SequenceTracker {
        &self.sequence
    }

    /// Diagnostic counters
    #[must_use]
    pub fn stats(&self) -> ListenerStreamStats {
        self.stats
    }

    /// Decode one raw Ethernet frame and deliver its samples if locked
    pub fn process_packet<S: AudioSink + ?Sized>(
        &mut self,
        frame: &[u8],
        sink: &mut S,
    ) -> PacketDisposition {
        if !self.active {
            return PacketDisposition::Inactive;
        }

        let disposition = match self.config.format {
            StreamFormat::Aaf => Frame::parse(frame).map(|f| self.process_aaf(&f, sink)),
            StreamFormat::Iec61883_6 => {
                Frame::parse(frame).and_then(|f| self.process_61883(&f, sink))
            }
            StreamFormat::Crf => CrfFrame::parse(frame).and_then(|f| self.process_crf(&f, sink)),
        };

        match disposition {
            Ok(disposition) => {
                if disposition.is_delivered() {
                    self.stats.delivered += 1;
                }
                disposition
            }
            Err(reason) => {
                self.stats.rejected += 1;
                tracing::trace!(stream = %self.handle, %reason, "1722 packet rejected");
                PacketDisposition::Rejected(reason)
            }
        }
    }

    fn track_sequence(&mut self, seq: u8, timestamp: u32) {
        if let Some(gap) = self.sequence.record(seq) {
            tracing::debug!(
                stream = %self.handle,
                previous = gap.previous,
                current = gap.current,
                lost = gap.lost,
                timestamp,
                "1722 sequence discontinuity"
            );
        }
    }

    /// Start acquisition over with `geometry` as the new candidate
    fn restart_acquisition(&mut self, geometry: Option<Geometry>) {
        if self.chan_lock >= LOCK_THRESHOLD {
            self.stats.relocks += 1;
        }
        tracing::debug!(stream = %self.handle, ?geometry, "1722 stream geometry changed");
        self.geometry = geometry;
        self.chan_lock = 0;
        self.evidence = 0;
        self.rate = 0;
    }

    fn process_aaf<S: AudioSink + ?Sized>(
        &mut self,
        frame: &Frame<'_>,
        sink: &mut S,
    ) -> PacketDisposition {
        let header = frame.header();
        self.track_sequence(header.sequence_number(), header.timestamp());

        let format = AafFormat::from_word(header.format_specific());
        let channels = usize::from(format.channels_per_frame);

        if channels == 0 {
            self.restart_acquisition(None);
            return PacketDisposition::Acquiring { chan_lock: 0 };
        }

        let geometry = Geometry::Aaf {
            channels,
            nsr: format.nsr,
        };
        if self.geometry != Some(geometry) {
            self.restart_acquisition(Some(geometry));
            self.num_channels_in_payload = channels;
        }

        if self.chan_lock < LOCK_THRESHOLD {
            let frames = header.stream_data_length() as usize / (channels * SAMPLE_BYTES);
            self.evidence += u32::try_from(frames).unwrap_or(u32::MAX);
            self.chan_lock += 1;

            if self.chan_lock < LOCK_THRESHOLD {
                return PacketDisposition::Acquiring {
                    chan_lock: self.chan_lock,
                };
            }

            self.rate = format.rate();
            self.frames_per_packet = if self.evidence > 0 {
                self.evidence.div_ceil(LOCK_THRESHOLD) as usize
            } else {
                self.rate.div_ceil(PACKET_RATE) as usize
            };
            tracing::debug!(
                stream = %self.handle,
                rate = self.rate,
                frames = self.frames_per_packet,
                channels,
                ethernet_header = frame.ethernet_header_len(),
                "Locked to AAF stream"
            );
            return PacketDisposition::Locked { rate: self.rate };
        }

        if self.config.num_channels != 0 && channels != self.config.num_channels {
            self.stats.channel_mismatches += 1;
            tracing::trace!(
                stream = %self.handle,
                expected = self.config.num_channels,
                channels,
                "AAF channel count differs from configuration"
            );
        }

        let frames = match header.stream_data_length() as usize / (channels * SAMPLE_BYTES) {
            0 => self.frames_per_packet,
            n => n,
        };
        let frames = deliver(
            sink,
            &self.config.map,
            header,
            frame.payload(),
            channels,
            channels,
            frames,
        );
        PacketDisposition::Delivered { frames }
    }

    fn process_61883<S: AudioSink + ?Sized>(
        &mut self,
        frame: &Frame<'_>,
        sink: &mut S,
    ) -> Result<PacketDisposition, AvbtpDecodeError> {
        let header = frame.header();
        let cip = CipHeader::new_checked(frame.payload())?;
        let data = &frame.payload()[CIP_HDR_SIZE..];

        self.track_sequence(header.sequence_number(), header.timestamp());

        let data_len = match header.stream_data_length() as usize {
            0 => data.len(),
            n => n.saturating_sub(CIP_HDR_SIZE).min(data.len()),
        };
        let num_samples = data_len / SAMPLE_BYTES;

        let prev_num_samples = std::mem::replace(&mut self.prev_num_samples, num_samples);
        let prev_dbc = self.prev_dbc.replace(cip.dbc());

        if self.chan_lock < LOCK_THRESHOLD {
            let dbc_diff = prev_dbc.map_or(0, |prev| usize::from(cip.dbc().wrapping_sub(prev)));
            if prev_num_samples == 0 || dbc_diff == 0 {
                return Ok(PacketDisposition::Acquiring {
                    chan_lock: self.chan_lock,
                });
            }

            let channels = prev_num_samples / dbc_diff;
            if channels == 0 {
                self.restart_acquisition(None);
                return Ok(PacketDisposition::Acquiring { chan_lock: 0 });
            }

            let geometry = Geometry::Iec61883 { channels };
            if self.geometry != Some(geometry) {
                self.restart_acquisition(Some(geometry));
                self.num_channels_in_payload = channels;
            }

            self.evidence += u32::try_from(num_samples).unwrap_or(u32::MAX);
            self.chan_lock += 1;

            if self.chan_lock < LOCK_THRESHOLD {
                return Ok(PacketDisposition::Acquiring {
                    chan_lock: self.chan_lock,
                });
            }

            let per_block = u32::try_from(channels).unwrap_or(u32::MAX);
            let blocks = self.evidence / per_block / LOCK_THRESHOLD;
            self.rate = rate_for_block_count(blocks);
            self.frames_per_packet = blocks as usize;
            tracing::debug!(
                stream = %self.handle,
                rate = self.rate,
                frames = self.frames_per_packet,
                channels,
                "Locked to 61883-6 stream"
            );
            return Ok(PacketDisposition::Locked { rate: self.rate });
        }

        let stride = self.num_channels_in_payload;
        let channels = self.config.num_channels.min(stride);
        let frames = deliver(
            sink,
            &self.config.map,
            header,
            data,
            channels,
            stride,
            num_samples / stride,
        );
        Ok(PacketDisposition::Delivered { frames })
    }

    fn process_crf<S: AudioSink + ?Sized>(
        &mut self,
        frame: &CrfFrame<'_>,
        sink: &mut S,
    ) -> Result<PacketDisposition, AvbtpDecodeError> {
        let header = frame.header();
        let timestamp = frame
            .first_timestamp_low()
            .ok_or(AvbtpDecodeError::TooShort {
                needed: CRF_HDR_SIZE + 8,
                have: CRF_HDR_SIZE + frame.timestamps_len(),
            })?;

        self.track_sequence(header.sequence_number(), timestamp);

        let Some(target) = self.config.map.sink(0) else {
            return Ok(PacketDisposition::Delivered { frames: 0 });
        };

        sink.set_timestamp(target, timestamp, 0);
        sink.maintain(target);
        sink.strided_push(target, StridedSamples::new(&PLACEHOLDER, 0, 1, 1));

        Ok(PacketDisposition::Delivered { frames: 1 })
    }
}

/// Hand one locked packet's samples to the mapped sinks
///
/// Returns frames pushed per channel.
fn deliver<S: AudioSink + ?Sized>(
    sink: &mut S,
    map: &ChannelMap,
    header: &AvbtpHeader<&[u8]>,
    samples: &[u8],
    channels: usize,
    stride: usize,
    frames: usize,
) -> usize {
    if header.tv() {
        let ts = header.timestamp();
        for (_, target) in map.mapped(channels) {
            sink.set_timestamp(target, ts, 0);
        }
    }

    for (_, target) in map.mapped(channels) {
        sink.maintain(target);
    }

    let mut pushed = 0;
    for (channel, target) in map.mapped(channels) {
        let view = StridedSamples::new(samples, channel, stride, frames);
        pushed = view.len();
        sink.strided_push(target, view);
    }
    pushed
}

#[cfg(test)]
mod tests {
    use super::rate_for_block_count;

    #[test]
    fn test_block_count_rates() {
        assert_eq!(rate_for_block_count(6), 48_000);
        assert_eq!(rate_for_block_count(12), 96_000);
        assert_eq!(rate_for_block_count(24), 192_000);
        assert_eq!(rate_for_block_count(5), 44_100);
        assert_eq!(rate_for_block_count(11), 88_200);
        assert_eq!(rate_for_block_count(7), 0);
        assert_eq!(rate_for_block_count(0), 0);
    }
}
