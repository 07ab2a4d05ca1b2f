use byteorder::{BigEndian, ByteOrder};

use super::constants::CRF_HDR_SIZE;
use super::ethernet::ethernet_header_len;
use super::header::AvbtpDecodeError;

/// Clock reference format header (20 bytes)
///
/// | byte  | bits  | field               |
/// |-------|-------|---------------------|
/// | 0     | 7-0   | subtype             |
/// | 1     | 7     | sv                  |
/// | 1     | 6-4   | version             |
/// | 1     | 3     | mr                  |
/// | 1     | 1     | fs (frame sync)     |
/// | 1     | 0     | tu                  |
/// | 2     | 7-0   | sequence number     |
/// | 3     | 7-0   | type                |
/// | 4-11  |       | stream id           |
/// | 12    | 7-5   | pull                |
/// | 12-15 | 28-0  | base frequency      |
/// | 16-17 |       | crf data length     |
/// | 18-19 |       | timestamp interval  |
///
/// The header is followed by `crf_data_length / 8` big-endian 64-bit
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrfHeader<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> CrfHeader<T> {
    /// Wrap a buffer after checking it can hold the header
    ///
    /// # Errors
    ///
    /// Returns `AvbtpDecodeError::TooShort` if the buffer is too small.
    pub fn new_checked(buffer: T) -> Result<Self, AvbtpDecodeError> {
        let have = buffer.as_ref().len();
        if have < CRF_HDR_SIZE {
            return Err(AvbtpDecodeError::TooShort {
                needed: CRF_HDR_SIZE,
                have,
            });
        }
        Ok(Self { buffer })
    }

    fn bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..CRF_HDR_SIZE]
    }

    pub fn subtype(&self) -> u8 {
        self.bytes()[0]
    }

    pub fn sv(&self) -> bool {
        self.bytes()[1] & 0x80 != 0
    }

    pub fn version(&self) -> u8 {
        (self.bytes()[1] >> 4) & 0x07
    }

    pub fn mr(&self) -> bool {
        self.bytes()[1] & 0x08 != 0
    }

    pub fn fs(&self) -> bool {
        self.bytes()[1] & 0x02 != 0
    }

    pub fn tu(&self) -> bool {
        self.bytes()[1] & 0x01 != 0
    }

    pub fn sequence_number(&self) -> u8 {
        self.bytes()[2]
    }

    pub fn crf_type(&self) -> u8 {
        self.bytes()[3]
    }

    pub fn stream_id(&self) -> u64 {
        BigEndian::read_u64(&self.bytes()[4..12])
    }

    pub fn pull(&self) -> u8 {
        self.bytes()[12] >> 5
    }

    pub fn base_frequency(&self) -> u32 {
        BigEndian::read_u32(&self.bytes()[12..16]) & 0x1FFF_FFFF
    }

    pub fn crf_data_length(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[16..18])
    }

    pub fn timestamp_interval(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[18..20])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> CrfHeader<T> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[..CRF_HDR_SIZE]
    }

    pub fn set_subtype(&mut self, value: u8) {
        self.bytes_mut()[0] = value;
    }

    /// Set sv (bit 7) and version (bits 6-4) of byte 1, clearing the rest
    pub fn set_sv_version(&mut self, sv: bool, version: u8) {
        self.bytes_mut()[1] = (u8::from(sv) << 7) | ((version & 0x07) << 4);
    }

    pub fn set_sequence_number(&mut self, value: u8) {
        self.bytes_mut()[2] = value;
    }

    pub fn set_crf_type(&mut self, value: u8) {
        self.bytes_mut()[3] = value;
    }

    pub fn set_stream_id(&mut self, value: u64) {
        BigEndian::write_u64(&mut self.bytes_mut()[4..12], value);
    }

    pub fn set_pull_base_frequency(&mut self, pull: u8, base_frequency: u32) {
        let word = (u32::from(pull & 0x07) << 29) | (base_frequency & 0x1FFF_FFFF);
        BigEndian::write_u32(&mut self.bytes_mut()[12..16], word);
    }

    pub fn set_crf_data_length(&mut self, value: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[16..18], value);
    }

    pub fn set_timestamp_interval(&mut self, value: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[18..20], value);
    }
}

/// A received CRF frame
#[derive(Debug, Clone, Copy)]
pub struct CrfFrame<'a> {
    header: CrfHeader<&'a [u8]>,
    timestamps: &'a [u8],
}

impl<'a> CrfFrame<'a> {
    /// Split a raw Ethernet frame into CRF header and timestamp area
    ///
    /// Only the version is checked; CRF talkers in the field do not all set sv.
    ///
    /// # Errors
    ///
    /// Returns `TooShort` when nothing follows the CRF header and
    /// `UnsupportedVersion` for a non-zero version.
    pub fn parse(frame: &'a [u8]) -> Result<Self, AvbtpDecodeError> {
        let eth_len = ethernet_header_len(frame);
        let body_start = eth_len + CRF_HDR_SIZE;
        if frame.len() <= body_start {
            return Err(AvbtpDecodeError::TooShort {
                needed: body_start + 1,
                have: frame.len(),
            });
        }

        let header = CrfHeader::new_checked(&frame[eth_len..body_start])?;
        if header.version() != 0 {
            return Err(AvbtpDecodeError::UnsupportedVersion(header.version()));
        }

        Ok(Self {
            header,
            timestamps: &frame[body_start..],
        })
    }

    /// CRF header
    #[must_use]
    pub fn header(&self) -> &CrfHeader<&'a [u8]> {
        &self.header
    }

    /// Iterate the 64-bit timestamps carried after the header
    pub fn timestamps(&self) -> impl Iterator<Item = u64> + 'a {
        self.timestamps.chunks_exact(8).map(BigEndian::read_u64)
    }

    /// Bytes following the header
    #[must_use]
    pub fn timestamps_len(&self) -> usize {
        self.timestamps.len()
    }

    /// Low 32 bits of the first timestamp, the value fed to the media clock
    #[must_use]
    pub fn first_timestamp_low(&self) -> Option<u32> {
        self.timestamps().next().map(|ts| ts as u32)
    }
}
