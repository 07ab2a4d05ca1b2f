use super::constants::AVBTP_HDR_SIZE;
use super::ethernet::{EthernetHeader, ethernet_header_len};
use super::header::{AvbtpDecodeError, AvbtpHeader};

/// A received 1722 stream data frame
///
/// Borrowed view over the raw Ethernet frame: header length is chosen from
/// the frame itself, the AVBTP header is read in place and the payload is
/// whatever follows it.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    ethernet_len: usize,
    header: AvbtpHeader<&'a [u8]>,
    payload: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Parse a raw Ethernet frame and apply the conformance filter
    ///
    /// # Errors
    ///
    /// Returns `TooShort` unless at least one byte follows the AVBTP header,
    /// `UnsupportedVersion` for a non-zero version and `StreamIdNotValid`
    /// when sv is clear.
    pub fn parse(frame: &'a [u8]) -> Result<Self, AvbtpDecodeError> {
        let ethernet_len = ethernet_header_len(frame);
        let payload_start = ethernet_len + AVBTP_HDR_SIZE;
        if frame.len() <= payload_start {
            return Err(AvbtpDecodeError::TooShort {
                needed: payload_start + 1,
                have: frame.len(),
            });
        }

        let header = AvbtpHeader::new_checked(&frame[ethernet_len..payload_start])?;
        header.check_conformance()?;

        Ok(Self {
            ethernet_len,
            header,
            payload: &frame[payload_start..],
        })
    }

    /// Length of the Ethernet header in this frame (14 or 18)
    #[must_use]
    pub fn ethernet_header_len(&self) -> usize {
        self.ethernet_len
    }

    /// AVBTP stream header
    #[must_use]
    pub fn header(&self) -> &AvbtpHeader<&'a [u8]> {
        &self.header
    }

    /// Bytes after the AVBTP header
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}

/// Mutable view over an outgoing 1722 frame, for stamping in place
#[derive(Debug)]
pub struct FrameMut<'a> {
    ethernet_len: usize,
    buffer: &'a mut [u8],
}

impl<'a> FrameMut<'a> {
    /// Wrap a frame buffer; the Ethernet header length comes from byte 12
    ///
    /// # Errors
    ///
    /// Returns `TooShort` if the buffer cannot hold both headers.
    pub fn new_checked(buffer: &'a mut [u8]) -> Result<Self, AvbtpDecodeError> {
        let ethernet_len = ethernet_header_len(buffer);
        let needed = ethernet_len + AVBTP_HDR_SIZE;
        if buffer.len() < needed {
            return Err(AvbtpDecodeError::TooShort {
                needed,
                have: buffer.len(),
            });
        }
        Ok(Self {
            ethernet_len,
            buffer,
        })
    }

    /// Length of the Ethernet header in this frame (14 or 18)
    #[must_use]
    pub fn ethernet_header_len(&self) -> usize {
        self.ethernet_len
    }

    /// Writable AVBTP stream header
    pub fn header_mut(&mut self) -> AvbtpHeader<&mut [u8]> {
        let start = self.ethernet_len;
        AvbtpHeader::new_unchecked(&mut self.buffer[start..start + AVBTP_HDR_SIZE])
    }

    /// Writable bytes after the AVBTP header
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[self.ethernet_len + AVBTP_HDR_SIZE..]
    }
}

/// Ethernet and AVBTP headers of one packet, owned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Link layer header
    pub ethernet: EthernetHeader,
    /// Transport header
    pub avbtp: AvbtpHeader<[u8; AVBTP_HDR_SIZE]>,
}

impl PacketHeader {
    /// Encoded length of both headers
    #[must_use]
    pub fn len(&self) -> usize {
        self.ethernet.len() + AVBTP_HDR_SIZE
    }

    /// Always false
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Decode both headers from a raw frame, applying the conformance filter
    ///
    /// # Errors
    ///
    /// Returns `TooShort` if the frame cannot hold both headers, otherwise
    /// the conformance rejection.
    pub fn decode(frame: &[u8]) -> Result<Self, AvbtpDecodeError> {
        let ethernet = EthernetHeader::decode(frame)?;
        let start = ethernet.len();
        let end = start + AVBTP_HDR_SIZE;
        if frame.len() < end {
            return Err(AvbtpDecodeError::TooShort {
                needed: end,
                have: frame.len(),
            });
        }

        let avbtp = AvbtpHeader::decode(&frame[start..end])?;
        avbtp.check_conformance()?;

        Ok(Self { ethernet, avbtp })
    }

    /// Encode both headers into the start of `buf`, returning bytes written
    ///
    /// # Errors
    ///
    /// Returns `TooShort` if `buf` cannot hold both headers.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, AvbtpDecodeError> {
        let needed = self.len();
        if buf.len() < needed {
            return Err(AvbtpDecodeError::TooShort {
                needed,
                have: buf.len(),
            });
        }

        let start = self.ethernet.encode_into(buf)?;
        buf[start..needed].copy_from_slice(&self.avbtp.encode());
        Ok(needed)
    }
}
