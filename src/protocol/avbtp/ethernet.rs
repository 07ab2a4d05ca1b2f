use byteorder::{BigEndian, ByteOrder};

use super::constants::{ETHERNET_HDR_SIZE, ETHERNET_HDR_SIZE_UNTAGGED, VLAN_TAG_MARKER, VLAN_TPID};
use super::header::AvbtpDecodeError;
use crate::types::MacAddress;

/// Ethernet header length for this frame.
///
/// Byte 12 carrying the 802.1Q marker means an 18 byte tagged header,
/// anything else a 14 byte untagged one. Evaluated per frame.
#[must_use]
pub fn ethernet_header_len(frame: &[u8]) -> usize {
    if frame.get(12) == Some(&VLAN_TAG_MARKER) {
        ETHERNET_HDR_SIZE
    } else {
        ETHERNET_HDR_SIZE_UNTAGGED
    }
}

/// 802.1Q tag control information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanTag {
    /// Priority code point (3 bits, TCI bits 15-13)
    pub pcp: u8,
    /// Canonical format indicator (TCI bit 12)
    pub cfi: bool,
    /// VLAN identifier (12 bits, TCI bits 11-0)
    pub vid: u16,
}

impl VlanTag {
    /// Encode the 16-bit tag control information
    #[must_use]
    pub fn tci(&self) -> u16 {
        (u16::from(self.pcp & 0x07) << 13) | (u16::from(self.cfi) << 12) | (self.vid & 0x0FFF)
    }

    /// Decode from the 16-bit tag control information
    #[must_use]
    pub fn from_tci(tci: u16) -> Self {
        Self {
            pcp: ((tci >> 13) & 0x07) as u8,
            cfi: (tci >> 12) & 0x01 != 0,
            vid: tci & 0x0FFF,
        }
    }
}

/// Ethernet II header with optional VLAN tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC (usually the stream multicast address)
    pub destination: MacAddress,
    /// Source MAC
    pub source: MacAddress,
    /// 802.1Q tag, present on AVB class traffic
    pub vlan: Option<VlanTag>,
    /// Ethertype after the tag
    pub ethertype: u16,
}

impl EthernetHeader {
    /// Encoded length of this header
    #[must_use]
    pub fn len(&self) -> usize {
        if self.vlan.is_some() {
            ETHERNET_HDR_SIZE
        } else {
            ETHERNET_HDR_SIZE_UNTAGGED
        }
    }

    /// Always false, a header is never empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Decode from the start of a frame
    ///
    /// # Errors
    ///
    /// Returns `AvbtpDecodeError::TooShort` if the frame cannot hold the header.
    pub fn decode(frame: &[u8]) -> Result<Self, AvbtpDecodeError> {
        let len = ethernet_header_len(frame);
        if frame.len() < len {
            return Err(AvbtpDecodeError::TooShort {
                needed: len,
                have: frame.len(),
            });
        }

        let vlan = (len == ETHERNET_HDR_SIZE)
            .then(|| VlanTag::from_tci(BigEndian::read_u16(&frame[14..16])));

        Ok(Self {
            destination: MacAddress::from_slice(&frame[0..6]),
            source: MacAddress::from_slice(&frame[6..12]),
            vlan,
            ethertype: BigEndian::read_u16(&frame[len - 2..len]),
        })
    }

    /// Encode into the start of `buf`, returning the bytes written
    ///
    /// # Errors
    ///
    /// Returns `AvbtpDecodeError::TooShort` if `buf` cannot hold the header.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize, AvbtpDecodeError> {
        let len = self.len();
        if buf.len() < len {
            return Err(AvbtpDecodeError::TooShort {
                needed: len,
                have: buf.len(),
            });
        }

        buf[0..6].copy_from_slice(self.destination.as_bytes());
        buf[6..12].copy_from_slice(self.source.as_bytes());
        if let Some(tag) = self.vlan {
            BigEndian::write_u16(&mut buf[12..14], VLAN_TPID);
            BigEndian::write_u16(&mut buf[14..16], tag.tci());
        }
        BigEndian::write_u16(&mut buf[len - 2..len], self.ethertype);

        Ok(len)
    }
}
