//! 1722 talker path
//!
//! Packs audio frames into AAF stream packets. Each outgoing stream owns one
//! packet buffer whose static headers are written once at configuration;
//! every frame fills the next sample slot and the last frame of a packet
//! stamps the presentation time, sequence number and stream id.

pub mod builder;
pub mod registry;


pub use builder::TalkerStream;
pub use registry::{Talker, TalkerCounters, TalkerState};

/// One audio frame from the local source
///
/// `samples` is indexed by the stream's channel map; `timestamp` is the
/// local reference-timer value at which the frame was sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFrame<'a> {
    /// One sample per source slot, host order
    pub samples: &'a [u32],
    /// Local timer value of this frame
    pub timestamp: u32,
}

impl<'a> AudioFrame<'a> {
    /// Frame over `samples` sampled at local time `timestamp`
    #[must_use]
    pub fn new(samples: &'a [u32], timestamp: u32) -> Self {
        Self { samples, timestamp }
    }
}
