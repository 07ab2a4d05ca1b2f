//! Testing utilities
//!
//! Synthetic 1722 frames, a recording audio sink and a seeded link
//! simulator for exercising listener and talker paths without hardware.

/// Link impairment simulation
pub mod network_sim;
/// Synthetic packet builders
pub mod packets;
/// Recording audio sink
pub mod sink;


pub use network_sim::NetworkSimulator;
pub use packets::{
    AafPacketBuilder, CrfPacketBuilder, Iec61883PacketBuilder, TEST_DESTINATION, TEST_SOURCE,
    sample_value,
};
pub use sink::{RecordingSink, SinkEvent};

/// Translator that maps local ticks 1:1 onto PTP nanoseconds plus `offset`
#[must_use]
pub fn offset_translator(offset: u32) -> impl Fn(u32) -> u32 {
    move |local_ts: u32| local_ts.wrapping_add(offset)
}
