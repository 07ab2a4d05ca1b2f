//! IEEE 1722 (AVBTP) wire format
//!
//! Byte-layout views over caller-owned buffers. Every multi-byte field is
//! big-endian on the wire and is only ever read or written through the
//! accessors here, so the in-memory representation stays a byte sequence.
//!
//! ```text
//! | dst(6) | src(6) | [0x8100 | PCP/CFI/VID(2)] | ethertype(2) |  14 or 18 bytes
//! | subtype | sv/ver/mr/gv/tv | seq | tu | stream_id(8) |
//! | avtp_timestamp(4) | format_specific(4) | data_len(2) | proto(2) |  24 bytes
//! | payload ...                                                      |
//! ```

#![allow(missing_docs)]

mod aaf;
mod cip;
mod crf;
mod ethernet;
mod frame;
mod header;

#[cfg(test)]
mod tests;

pub use aaf::{AafFormat, nsr_for_rate, rate_for_nsr};
pub use cip::CipHeader;
pub use crf::{CrfFrame, CrfHeader};
pub use ethernet::{EthernetHeader, VlanTag, ethernet_header_len};
pub use frame::{Frame, FrameMut, PacketHeader};
pub use header::{AvbtpDecodeError, AvbtpHeader};

/// 1722 protocol constants
pub mod constants {
    /// Ethernet header length with an 802.1Q tag
    pub const ETHERNET_HDR_SIZE: usize = 18;
    /// Ethernet header length without a tag
    pub const ETHERNET_HDR_SIZE_UNTAGGED: usize = 14;
    /// AVBTP common stream header length
    pub const AVBTP_HDR_SIZE: usize = 24;
    /// IEC 61883-6 CIP header length
    pub const CIP_HDR_SIZE: usize = 8;
    /// CRF header length
    pub const CRF_HDR_SIZE: usize = 20;

    /// First byte of the 802.1Q TPID, checked at offset 12
    pub const VLAN_TAG_MARKER: u8 = 0x81;
    /// 802.1Q tag protocol identifier
    pub const VLAN_TPID: u16 = 0x8100;
    /// AVTP ethertype
    pub const AVTP_ETHERTYPE: u16 = 0x22F0;

    /// Default priority code point for class A traffic
    pub const DEFAULT_PCP: u8 = 3;
    /// Default canonical format indicator
    pub const DEFAULT_CFI: bool = false;
    /// Default VLAN
    pub const DEFAULT_VID: u16 = 2;

    /// Subtype: IEC 61883/IIDC
    pub const SUBTYPE_61883: u8 = 0x00;
    /// Subtype: AVTP audio format
    pub const SUBTYPE_AAF: u8 = 0x02;
    /// Subtype: clock reference format
    pub const SUBTYPE_CRF: u8 = 0x04;

    /// AAF format code for 32-bit integer samples
    pub const AAF_FORMAT_INT_32BIT: u8 = 0x02;
    /// Bytes per AAF sample
    pub const SAMPLE_BYTES: usize = 4;

    /// 1722 class A packet rate
    pub const PACKET_RATE: u32 = 8000;

    /// Default presentation time offset (2 ms)
    pub const DEFAULT_PRESENTATION_DELAY_NS: u32 = 2_000_000;

    /// Maximum channels carried by one stream
    pub const MAX_CHANNELS_PER_STREAM: usize = 8;
}
