use byteorder::{BigEndian, ByteOrder};

use super::constants::CIP_HDR_SIZE;
use super::header::AvbtpDecodeError;

/// IEC 61883-6 common isochronous packet header (8 bytes)
///
/// Sits at the start of a 61883 payload, after the AVBTP header.
///
/// | byte | bits | field                    |
/// |------|------|--------------------------|
/// | 0    | 7-6  | eoh1 (0)                 |
/// | 0    | 5-0  | sid                      |
/// | 1    | 7-0  | dbs (quadlets per block) |
/// | 2    | 7-6  | fn                       |
/// | 2    | 5-3  | qpc                      |
/// | 2    | 2    | sph                      |
/// | 3    | 7-0  | dbc (data block counter) |
/// | 4    | 7-6  | eoh2 (2)                 |
/// | 4    | 5-0  | fmt                      |
/// | 5    | 7-0  | fdf                      |
/// | 6-7  |      | syt                      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipHeader<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> CipHeader<T> {
    /// Wrap a buffer after checking it can hold the header
    ///
    /// # Errors
    ///
    /// Returns `AvbtpDecodeError::TooShort` if the buffer is too small.
    pub fn new_checked(buffer: T) -> Result<Self, AvbtpDecodeError> {
        let have = buffer.as_ref().len();
        if have < CIP_HDR_SIZE {
            return Err(AvbtpDecodeError::TooShort {
                needed: CIP_HDR_SIZE,
                have,
            });
        }
        Ok(Self { buffer })
    }

    fn bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..CIP_HDR_SIZE]
    }

    pub fn sid(&self) -> u8 {
        self.bytes()[0] & 0x3F
    }

    pub fn dbs(&self) -> u8 {
        self.bytes()[1]
    }

    pub fn fraction_number(&self) -> u8 {
        self.bytes()[2] >> 6
    }

    pub fn qpc(&self) -> u8 {
        (self.bytes()[2] >> 3) & 0x07
    }

    pub fn sph(&self) -> bool {
        self.bytes()[2] & 0x04 != 0
    }

    pub fn dbc(&self) -> u8 {
        self.bytes()[3]
    }

    pub fn fmt(&self) -> u8 {
        self.bytes()[4] & 0x3F
    }

    pub fn fdf(&self) -> u8 {
        self.bytes()[5]
    }

    pub fn syt(&self) -> u16 {
        BigEndian::read_u16(&self.bytes()[6..8])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> CipHeader<T> {
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[..CIP_HDR_SIZE]
    }

    /// Write the end-of-header markers (eoh1 = 0, eoh2 = 2)
    pub fn init_markers(&mut self) {
        let bytes = self.bytes_mut();
        bytes[0] &= 0x3F;
        bytes[4] = (bytes[4] & 0x3F) | 0x80;
    }

    pub fn set_sid(&mut self, value: u8) {
        let byte = &mut self.bytes_mut()[0];
        *byte = (*byte & 0xC0) | (value & 0x3F);
    }

    pub fn set_dbs(&mut self, value: u8) {
        self.bytes_mut()[1] = value;
    }

    pub fn set_dbc(&mut self, value: u8) {
        self.bytes_mut()[3] = value;
    }

    pub fn set_fmt(&mut self, value: u8) {
        let byte = &mut self.bytes_mut()[4];
        *byte = (*byte & 0xC0) | (value & 0x3F);
    }

    pub fn set_fdf(&mut self, value: u8) {
        self.bytes_mut()[5] = value;
    }

    pub fn set_syt(&mut self, value: u16) {
        BigEndian::write_u16(&mut self.bytes_mut()[6..8], value);
    }
}
