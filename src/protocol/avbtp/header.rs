use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use super::constants::AVBTP_HDR_SIZE;

/// AVBTP decode errors
///
/// These are protocol-conformance rejections. The listener path turns them
/// into a dropped-packet count, never into a failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AvbtpDecodeError {
    #[error("buffer too short: need {needed} bytes, have {have}")]
    TooShort { needed: usize, have: usize },

    #[error("unsupported AVBTP version: {0}")]
    UnsupportedVersion(u8),

    #[error("stream id not valid")]
    StreamIdNotValid,
}

/// AVBTP common stream data header (24 bytes)
///
/// A view over any byte container. Getters need `AsRef<[u8]>`, setters
/// additionally `AsMut<[u8]>`, so the same type reads a received frame in
/// place and stamps an outgoing one. The owned form is
/// `AvbtpHeader<[u8; 24]>`.
///
/// | byte  | bits | field                  |
/// |-------|------|------------------------|
/// | 0     | 7-0  | subtype                |
/// | 1     | 7    | sv (stream id valid)   |
/// | 1     | 6-4  | version                |
/// | 1     | 3    | mr (media clock restart)|
/// | 1     | 1    | gv (gateway info valid)|
/// | 1     | 0    | tv (timestamp valid)   |
/// | 2     | 7-0  | sequence number        |
/// | 3     | 0    | tu (timestamp uncertain)|
/// | 4-11  |      | stream id              |
/// | 12-15 |      | avtp timestamp         |
/// | 16-19 |      | format specific        |
/// | 20-21 |      | stream data length     |
/// | 22-23 |      | protocol specific      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvbtpHeader<T: AsRef<[u8]>> {
    buffer: T,
}

const SV_BIT: u8 = 0x80;
const VERSION_SHIFT: u8 = 4;
const VERSION_MASK: u8 = 0x07;
const MR_BIT: u8 = 0x08;
const GV_BIT: u8 = 0x02;
const TV_BIT: u8 = 0x01;
const TU_BIT: u8 = 0x01;

impl<T: AsRef<[u8]>> AvbtpHeader<T> {
    /// Encoded header size
    pub const SIZE: usize = AVBTP_HDR_SIZE;

    /// Wrap a buffer without a length check
    ///
    /// Accessors panic if the buffer is shorter than [`Self::SIZE`].
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    /// Wrap a buffer after checking it can hold the header
    ///
    /// # Errors
    ///
    /// Returns `AvbtpDecodeError::TooShort` if the buffer is too small.
    pub fn new_checked(buffer: T) -> Result<Self, AvbtpDecodeError> {
        let have = buffer.as_ref().len();
        if have < Self::SIZE {
            return Err(AvbtpDecodeError::TooShort {
                needed: Self::SIZE,
                have,
            });
        }
        Ok(Self { buffer })
    }

    /// Release the underlying buffer
    pub fn into_inner(self) -> T {
        self.buffer
    }

    fn bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..Self::SIZE]
    }

    /// Subtype (byte 0)
    pub fn subtype(&self) -> u8 {
        self.bytes()[0]
    }

    /// Stream id valid flag (byte 1, bit 7)
    pub fn sv(&self) -> bool {
        self.bytes()[1] & SV_BIT != 0
    }

    /// Version (byte 1, bits 6-4)
    pub fn version(&self) -> u8 {
        (self.bytes()[1] >> VERSION_SHIFT) & VERSION_MASK
    }

    /// Media clock restart (byte 1, bit 3)
    pub fn mr(&self) -> bool {
        self.bytes()[1] & MR_BIT != 0
    }

    /// Gateway info valid (byte 1, bit 1)
    pub fn gv(&self) -> bool {
        self.bytes()[1] & GV_BIT != 0
    }

    /// Timestamp valid (byte 1, bit 0)
    pub fn tv(&self) -> bool {
        self.bytes()[1] & TV_BIT != 0
    }

    /// Sequence number (byte 2)
    pub fn sequence_number(&self) -> u8 {
        self.bytes()[2]
    }

    /// Timestamp uncertain (byte 3, bit 0)
    pub fn tu(&self) -> bool {
        self.bytes()[3] & TU_BIT != 0
    }

    /// 64-bit stream id (bytes 4-11)
    pub fn stream_id(&self) -> u64 {
        BigEndian::read_u64(&self.bytes()[4..12])
    }

    /// Presentation timestamp in PTP nanoseconds mod 2^32 (bytes 12-15)
    pub fn timestamp(&self) -> u32 {
        BigEndian::read_u32(&self.bytes()[12..16])
    }

    /// Format specific word (bytes 16-19); the gateway info for 61883
    pub fn format_specific(&self) -> u32 {
        BigEndian::read_u32(&self.bytes()[16..20])
    }

    /// Payload length in bytes following this header (bytes 20-21)
    pub fn stream_data_length(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[20..22])
    }

    /// Protocol specific half-word (bytes 22-23)
    pub fn protocol_specific(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[22..24])
    }

    /// Conformance filter: stream id must be valid and version 0
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn check_conformance(&self) -> Result<(), AvbtpDecodeError> {
        let version = self.version();
        if version != 0 {
            return Err(AvbtpDecodeError::UnsupportedVersion(version));
        }
        if !self.sv() {
            return Err(AvbtpDecodeError::StreamIdNotValid);
        }
        Ok(())
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> AvbtpHeader<T> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[..AVBTP_HDR_SIZE]
    }

    fn set_flag(&mut self, index: usize, bit: u8, value: bool) {
        let byte = &mut self.bytes_mut()[index];
        if value {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    /// Set subtype (byte 0)
    pub fn set_subtype(&mut self, value: u8) {
        self.bytes_mut()[0] = value;
    }

    /// Set stream id valid (byte 1, bit 7)
    pub fn set_sv(&mut self, value: bool) {
        self.set_flag(1, SV_BIT, value);
    }

    /// Set version (byte 1, bits 6-4); higher bits of `value` are dropped
    pub fn set_version(&mut self, value: u8) {
        let byte = &mut self.bytes_mut()[1];
        let cleared = *byte & !(VERSION_MASK << VERSION_SHIFT);
        *byte = cleared | ((value & VERSION_MASK) << VERSION_SHIFT);
    }

    /// Set media clock restart (byte 1, bit 3)
    pub fn set_mr(&mut self, value: bool) {
        self.set_flag(1, MR_BIT, value);
    }

    /// Set gateway info valid (byte 1, bit 1)
    pub fn set_gv(&mut self, value: bool) {
        self.set_flag(1, GV_BIT, value);
    }

    /// Set timestamp valid (byte 1, bit 0)
    pub fn set_tv(&mut self, value: bool) {
        self.set_flag(1, TV_BIT, value);
    }

    /// Set sequence number (byte 2)
    pub fn set_sequence_number(&mut self, value: u8) {
        self.bytes_mut()[2] = value;
    }

    /// Set timestamp uncertain (byte 3, bit 0)
    pub fn set_tu(&mut self, value: bool) {
        self.set_flag(3, TU_BIT, value);
    }

    /// Set stream id (bytes 4-11)
    pub fn set_stream_id(&mut self, value: u64) {
        BigEndian::write_u64(&mut self.bytes_mut()[4..12], value);
    }

    /// Set the low 32 bits of the stream id (bytes 8-11)
    pub fn set_stream_id_low(&mut self, value: u32) {
        BigEndian::write_u32(&mut self.bytes_mut()[8..12], value);
    }

    /// Set avtp timestamp (bytes 12-15)
    pub fn set_timestamp(&mut self, value: u32) {
        BigEndian::write_u32(&mut self.bytes_mut()[12..16], value);
    }

    /// Set format specific word (bytes 16-19)
    pub fn set_format_specific(&mut self, value: u32) {
        BigEndian::write_u32(&mut self.bytes_mut()[16..20], value);
    }

    /// Set stream data length (bytes 20-21)
    pub fn set_stream_data_length(&mut self, value: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[20..22], value);
    }

    /// Set protocol specific half-word (bytes 22-23)
    pub fn set_protocol_specific(&mut self, value: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[22..24], value);
    }
}

impl AvbtpHeader<[u8; AVBTP_HDR_SIZE]> {
    /// All-zero owned header
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            buffer: [0; AVBTP_HDR_SIZE],
        }
    }

    /// Copy a header out of `buf`
    ///
    /// No conformance check; see [`AvbtpHeader::check_conformance`].
    ///
    /// # Errors
    ///
    /// Returns `AvbtpDecodeError::TooShort` if `buf` is too small.
    pub fn decode(buf: &[u8]) -> Result<Self, AvbtpDecodeError> {
        let view = AvbtpHeader::new_checked(buf)?;
        let mut buffer = [0; AVBTP_HDR_SIZE];
        buffer.copy_from_slice(view.bytes());
        Ok(Self { buffer })
    }

    /// Encoded bytes
    #[must_use]
    pub fn encode(&self) -> [u8; AVBTP_HDR_SIZE] {
        self.buffer
    }
}

impl Default for AvbtpHeader<[u8; AVBTP_HDR_SIZE]> {
    fn default() -> Self {
        Self::zeroed()
    }
}
