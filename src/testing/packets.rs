//! Synthetic 1722 frames

use byteorder::{BigEndian, ByteOrder};

use crate::protocol::avbtp::constants::{
    AVBTP_HDR_SIZE, AVTP_ETHERTYPE, CIP_HDR_SIZE, CRF_HDR_SIZE, DEFAULT_CFI, DEFAULT_PCP,
    DEFAULT_VID, SAMPLE_BYTES, SUBTYPE_61883, SUBTYPE_AAF, SUBTYPE_CRF,
};
use crate::protocol::avbtp::{AafFormat, AvbtpHeader, CipHeader, CrfHeader, EthernetHeader, VlanTag};
use crate::types::MacAddress;

/// Stream destination used by the builders
pub const TEST_DESTINATION: MacAddress = MacAddress([0x91, 0xE0, 0xF0, 0x00, 0xFE, 0x01]);
/// Stream source used by the builders
pub const TEST_SOURCE: MacAddress = MacAddress([0x00, 0x1B, 0x21, 0x00, 0x00, 0x01]);

/// Recognisable sample for `frame`/`channel`: channel in the top byte
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn sample_value(frame: usize, channel: usize) -> u32 {
    ((channel as u32 + 1) << 24) | (frame as u32 & 0x00FF_FFFF)
}

fn ethernet_header(tagged: bool) -> EthernetHeader {
    EthernetHeader {
        destination: TEST_DESTINATION,
        source: TEST_SOURCE,
        vlan: tagged.then_some(VlanTag {
            pcp: DEFAULT_PCP,
            cfi: DEFAULT_CFI,
            vid: DEFAULT_VID,
        }),
        ethertype: AVTP_ETHERTYPE,
    }
}

fn write_samples(buf: &mut [u8], first_frame: usize, frames: usize, channels: usize) {
    for frame in 0..frames {
        for channel in 0..channels {
            let offset = (frame * channels + channel) * SAMPLE_BYTES;
            BigEndian::write_u32(
                &mut buf[offset..offset + SAMPLE_BYTES],
                sample_value(first_frame + frame, channel),
            );
        }
    }
}

/// Builds AAF stream data frames
#[derive(Debug, Clone)]
pub struct AafPacketBuilder {
    channels: u16,
    nsr: u8,
    frames: usize,
    first_frame: usize,
    sequence: u8,
    timestamp: Option<u32>,
    stream_id: u64,
    tagged: bool,
    sv: bool,
    version: u8,
    stream_data_length: Option<u16>,
}

impl Default for AafPacketBuilder {
    fn default() -> Self {
        Self {
            channels: 2,
            nsr: 5,
            frames: 6,
            first_frame: 0,
            sequence: 0,
            timestamp: None,
            stream_id: 0x001B_2100_0000_0001,
            tagged: true,
            sv: true,
            version: 0,
            stream_data_length: None,
        }
    }
}

impl AafPacketBuilder {
    /// Two channels at 48 kHz, six frames, tagged
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Channels per frame
    #[must_use]
    pub fn channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Nominal sample rate code
    #[must_use]
    pub fn nsr(mut self, nsr: u8) -> Self {
        self.nsr = nsr;
        self
    }

    /// Frames in the payload
    #[must_use]
    pub fn frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    /// Index of the first frame, for sample values
    #[must_use]
    pub fn first_frame(mut self, first_frame: usize) -> Self {
        self.first_frame = first_frame;
        self
    }

    /// Sequence number
    #[must_use]
    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    /// Presentation timestamp; sets tv
    #[must_use]
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Emit an untagged 14 byte Ethernet header
    #[must_use]
    pub fn untagged(mut self) -> Self {
        self.tagged = false;
        self
    }

    /// Stream id valid flag
    #[must_use]
    pub fn sv(mut self, sv: bool) -> Self {
        self.sv = sv;
        self
    }

    /// Header version
    #[must_use]
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Override the stream data length field
    #[must_use]
    pub fn stream_data_length(mut self, length: u16) -> Self {
        self.stream_data_length = Some(length);
        self
    }

    /// Encode the frame
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(&self) -> Vec<u8> {
        let ethernet = ethernet_header(self.tagged);
        let eth_len = ethernet.len();
        let channels = usize::from(self.channels);
        let data_len = self.frames * channels * SAMPLE_BYTES;

        let mut buf = vec![0u8; eth_len + AVBTP_HDR_SIZE + data_len];
        // Buffer sized above; encoding cannot fail.
        let _ = ethernet.encode_into(&mut buf);

        let mut header = AvbtpHeader::new_unchecked(&mut buf[eth_len..eth_len + AVBTP_HDR_SIZE]);
        header.set_subtype(SUBTYPE_AAF);
        header.set_sv(self.sv);
        header.set_version(self.version);
        header.set_sequence_number(self.sequence);
        header.set_stream_id(self.stream_id);
        header.set_format_specific(AafFormat::int32(self.nsr, self.channels).to_word());
        header.set_stream_data_length(self.stream_data_length.unwrap_or(data_len as u16));
        if let Some(ts) = self.timestamp {
            header.set_tv(true);
            header.set_timestamp(ts);
        }

        write_samples(
            &mut buf[eth_len + AVBTP_HDR_SIZE..],
            self.first_frame,
            self.frames,
            channels,
        );
        buf
    }
}

/// Builds IEC 61883-6 stream data frames
#[derive(Debug, Clone)]
pub struct Iec61883PacketBuilder {
    channels: usize,
    blocks: usize,
    dbc: u8,
    sequence: u8,
    timestamp: Option<u32>,
}

impl Iec61883PacketBuilder {
    /// `channels` per data block, `blocks` data blocks per packet
    #[must_use]
    pub fn new(channels: usize, blocks: usize) -> Self {
        Self {
            channels,
            blocks,
            dbc: 0,
            sequence: 0,
            timestamp: None,
        }
    }

    /// Data block counter of the first block
    #[must_use]
    pub fn dbc(mut self, dbc: u8) -> Self {
        self.dbc = dbc;
        self
    }

    /// Sequence number
    #[must_use]
    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    /// Presentation timestamp; sets tv
    #[must_use]
    pub fn timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Encode the frame
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(&self) -> Vec<u8> {
        let ethernet = ethernet_header(true);
        let eth_len = ethernet.len();
        let data_len = self.blocks * self.channels * SAMPLE_BYTES;
        let payload_start = eth_len + AVBTP_HDR_SIZE;

        let mut buf = vec![0u8; payload_start + CIP_HDR_SIZE + data_len];
        let _ = ethernet.encode_into(&mut buf);

        let mut header = AvbtpHeader::new_unchecked(&mut buf[eth_len..payload_start]);
        header.set_subtype(SUBTYPE_61883);
        header.set_sv(true);
        header.set_sequence_number(self.sequence);
        header.set_stream_id(0x001B_2100_0000_0002);
        header.set_stream_data_length((CIP_HDR_SIZE + data_len) as u16);
        if let Some(ts) = self.timestamp {
            header.set_tv(true);
            header.set_timestamp(ts);
        }

        if let Ok(mut cip) = CipHeader::new_checked(&mut buf[payload_start..]) {
            cip.init_markers();
            cip.set_dbs(self.channels as u8);
            cip.set_dbc(self.dbc);
            cip.set_fmt(0x10);
            cip.set_fdf(0x02);
            cip.set_syt(0xFFFF);
        }

        write_samples(
            &mut buf[payload_start + CIP_HDR_SIZE..],
            0,
            self.blocks,
            self.channels,
        );
        buf
    }
}

/// Builds CRF frames
#[derive(Debug, Clone, Default)]
pub struct CrfPacketBuilder {
    timestamps: Vec<u64>,
    sequence: u8,
    version: u8,
}

impl CrfPacketBuilder {
    /// Frame carrying `timestamps`
    #[must_use]
    pub fn new(timestamps: Vec<u64>) -> Self {
        Self {
            timestamps,
            ..Self::default()
        }
    }

    /// Sequence number
    #[must_use]
    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    /// Header version
    #[must_use]
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Encode the frame
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(&self) -> Vec<u8> {
        let ethernet = ethernet_header(true);
        let eth_len = ethernet.len();
        let body = eth_len + CRF_HDR_SIZE;

        let mut buf = vec![0u8; body + self.timestamps.len() * 8];
        let _ = ethernet.encode_into(&mut buf);

        if let Ok(mut header) = CrfHeader::new_checked(&mut buf[eth_len..body]) {
            header.set_subtype(SUBTYPE_CRF);
            header.set_sv_version(true, self.version);
            header.set_sequence_number(self.sequence);
            header.set_crf_type(1);
            header.set_stream_id(0x001B_2100_0000_0003);
            header.set_pull_base_frequency(0, 48_000);
            header.set_crf_data_length((self.timestamps.len() * 8) as u16);
            header.set_timestamp_interval(160);
        }

        for (i, ts) in self.timestamps.iter().enumerate() {
            let offset = body + i * 8;
            BigEndian::write_u64(&mut buf[offset..offset + 8], *ts);
        }
        buf
    }
}
