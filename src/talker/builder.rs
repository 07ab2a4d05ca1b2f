//! AAF packet builder for one outgoing stream

use byteorder::{BigEndian, ByteOrder};
use bytes::BytesMut;

use super::AudioFrame;
use crate::error::{ConfigError, Result};
use crate::protocol::avbtp::constants::{
    AVBTP_HDR_SIZE, AVTP_ETHERTYPE, DEFAULT_CFI, DEFAULT_PCP, ETHERNET_HDR_SIZE, SAMPLE_BYTES,
    SUBTYPE_AAF,
};
use crate::protocol::avbtp::{
    AafFormat, AvbtpHeader, EthernetHeader, FrameMut, VlanTag, nsr_for_rate,
};
use crate::ptp::PtpTranslator;
use crate::types::TalkerStreamConfig;

/// Leading pad so the payload starts 32-bit aligned (2 + 18 + 24 = 44)
const ALIGN_PAD: usize = 2;

/// Headers in front of the samples
const HEADERS_LEN: usize = ETHERNET_HDR_SIZE + AVBTP_HDR_SIZE;

/// Packet-in-progress for one outgoing stream
///
/// ACCUMULATING until `samples_per_packet` frames are in, then the packet
/// is stamped, `build` reports its length and accumulation starts over.
#[derive(Debug)]
pub struct TalkerStream {
    config: TalkerStreamConfig,
    buffer: BytesMut,
    samples_per_packet: usize,
    current_samples_in_packet: usize,
    timestamp_valid: bool,
    timestamp: u32,
    sequence_number: u8,
}

impl TalkerStream {
    /// Validate `config`, allocate the packet buffer and write its static
    /// headers
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::Config` if the configuration is invalid.
    pub fn new(config: TalkerStreamConfig) -> Result<Self> {
        config.validate()?;

        let samples_per_packet = config.samples_per_packet();
        let data_len = samples_per_packet * config.num_channels * SAMPLE_BYTES;
        let mut stream = Self {
            buffer: BytesMut::zeroed(ALIGN_PAD + HEADERS_LEN + data_len),
            config,
            samples_per_packet,
            current_samples_in_packet: 0,
            timestamp_valid: false,
            timestamp: 0,
            sequence_number: 0,
        };
        stream.buffer_init()?;

        tracing::debug!(
            stream_id = stream.config.stream_id,
            channels = stream.config.num_channels,
            rate = stream.config.sample_rate,
            samples_per_packet,
            "Initialised talker stream buffer"
        );
        Ok(stream)
    }

    /// Write the static Ethernet, VLAN and AVBTP header fields
    #[allow(clippy::cast_possible_truncation)]
    fn buffer_init(&mut self) -> Result<()> {
        let nsr = nsr_for_rate(self.config.sample_rate)
            .ok_or(ConfigError::UnsupportedSampleRate(self.config.sample_rate))?;
        let data_len = self.data_len();

        let frame = &mut self.buffer[ALIGN_PAD..];
        frame[..HEADERS_LEN].fill(0);

        let ethernet = EthernetHeader {
            destination: self.config.destination,
            source: self.config.source,
            vlan: Some(VlanTag {
                pcp: DEFAULT_PCP,
                cfi: DEFAULT_CFI,
                vid: self.config.vlan,
            }),
            ethertype: AVTP_ETHERTYPE,
        };
        ethernet.encode_into(frame)?;

        let mut view = FrameMut::new_checked(frame)?;
        let mut header = view.header_mut();
        header.set_sv(true);
        header.set_subtype(SUBTYPE_AAF);
        header.set_stream_id(self.config.stream_id);
        header.set_format_specific(
            AafFormat::int32(nsr, self.config.num_channels as u16).to_word(),
        );
        header.set_stream_data_length(data_len as u16);
        Ok(())
    }

    /// Rewrite the VLAN id in the packet buffer
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVlan` for an id wider than 12 bits.
    pub fn set_vlan(&mut self, vid: u16) -> Result<()> {
        if vid > 0x0FFF {
            return Err(ConfigError::InvalidVlan(vid).into());
        }

        let tci = &mut self.buffer[ALIGN_PAD + 14..ALIGN_PAD + 16];
        let mut tag = VlanTag::from_tci(BigEndian::read_u16(tci));
        tag.vid = vid;
        BigEndian::write_u16(tci, tag.tci());
        self.config.vlan = vid;
        Ok(())
    }

    /// Add one frame; returns the packet length once the packet is complete
    ///
    /// Channel `i` of the stream takes `frame.samples[map[i]]`; a slot
    /// missing from the frame is sent as silence. The completed packet is
    /// available from [`packet`](Self::packet) until the next call.
    pub fn build<P: PtpTranslator + ?Sized>(
        &mut self,
        frame: &AudioFrame<'_>,
        translator: &P,
    ) -> Option<usize> {
        let channels = self.config.num_channels;
        let frame_bytes = channels * SAMPLE_BYTES;
        let mut offset = ALIGN_PAD + HEADERS_LEN + self.current_samples_in_packet * frame_bytes;
        for &slot in &self.config.map {
            let sample = frame.samples.get(slot).copied().unwrap_or(0);
            BigEndian::write_u32(&mut self.buffer[offset..offset + SAMPLE_BYTES], sample);
            offset += SAMPLE_BYTES;
        }

        self.timestamp = frame.timestamp;
        self.timestamp_valid = true;
        self.current_samples_in_packet += 1;

        if self.current_samples_in_packet < self.samples_per_packet {
            return None;
        }

        let ptp_ts = self.timestamp_valid.then(|| {
            translator
                .local_to_ptp(self.timestamp)
                .wrapping_add(self.config.presentation_delay_ns)
        });
        self.stamp_header(ptp_ts);

        tracing::trace!(
            sequence = self.sequence_number,
            ptp_ts = ?ptp_ts,
            "1722 packet ready"
        );

        self.sequence_number = self.sequence_number.wrapping_add(1);
        self.current_samples_in_packet = 0;
        self.timestamp_valid = false;
        Some(HEADERS_LEN + self.data_len())
    }

    /// Per-packet header fields
    #[allow(clippy::cast_possible_truncation)]
    fn stamp_header(&mut self, ptp_ts: Option<u32>) {
        let sequence = self.sequence_number;
        let stream_id_low = self.config.stream_id as u32;
        let Ok(mut frame) = FrameMut::new_checked(&mut self.buffer[ALIGN_PAD..]) else {
            return;
        };
        let mut header = frame.header_mut();
        header.set_tv(ptp_ts.is_some());
        header.set_timestamp(ptp_ts.unwrap_or(0));
        header.set_stream_id_low(stream_id_low);
        header.set_sequence_number(sequence);
    }

    fn data_len(&self) -> usize {
        self.samples_per_packet * self.config.num_channels * SAMPLE_BYTES
    }

    /// The frame as it goes on the wire, without the alignment pad
    #[must_use]
    pub fn packet(&self) -> &[u8] {
        &self.buffer[ALIGN_PAD..]
    }

    /// Stamped AVBTP header of the packet buffer
    #[must_use]
    pub fn header(&self) -> AvbtpHeader<&[u8]> {
        let start = ALIGN_PAD + ETHERNET_HDR_SIZE;
        AvbtpHeader::new_unchecked(&self.buffer[start..start + AVBTP_HDR_SIZE])
    }

    /// Stream configuration
    #[must_use]
    pub fn config(&self) -> &TalkerStreamConfig {
        &self.config
    }

    /// Frames per packet
    #[must_use]
    pub fn samples_per_packet(&self) -> usize {
        self.samples_per_packet
    }

    /// Frames in the packet being accumulated
    #[must_use]
    pub fn samples_in_packet(&self) -> usize {
        self.current_samples_in_packet
    }

    /// Whether the packet being accumulated has a timestamp
    #[must_use]
    pub fn timestamp_valid(&self) -> bool {
        self.timestamp_valid
    }

    /// Sequence number the next packet will carry
    #[must_use]
    pub fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    /// Discard the partial packet
    pub fn reset(&mut self) {
        if self.current_samples_in_packet > 0 {
            tracing::debug!(
                frames = self.current_samples_in_packet,
                "Discarding partial 1722 packet"
            );
        }
        self.current_samples_in_packet = 0;
        self.timestamp_valid = false;
    }
}
