//! 1722 listener path
//!
//! Decodes incoming stream packets, locks onto the stream geometry and hands
//! steady-state samples to per-channel audio sinks.
//!
//! ```text
//! UNLOCKED --16 consistent packets--> LOCKED
//!    ^                                  |
//!    +-------- geometry change ---------+
//! ```

pub mod registry;
pub mod sequence_tracker;
pub mod stream;

#[cfg(test)]
mod sequence_tracker_tests;
#[cfg(test)]
mod tests;

use byteorder::{BigEndian, ByteOrder};

pub use registry::{Listener, ListenerCounters};
pub use sequence_tracker::{GapInfo, SequenceStats, SequenceTracker};
pub use stream::{ListenerStream, ListenerStreamStats, LockState};

use crate::protocol::avbtp::AvbtpDecodeError;
use crate::protocol::avbtp::constants::SAMPLE_BYTES;
use crate::types::SinkId;

/// Consecutive consistent packets needed before samples are delivered
pub const LOCK_THRESHOLD: u32 = 16;

/// Destination for decoded audio, one FIFO per sink
///
/// Calls for one stream arrive from a single decode path, in packet order.
pub trait AudioSink {
    /// Presentation time (PTP ns mod 2^32) of sample `sample_index` of the
    /// samples pushed next
    fn set_timestamp(&mut self, sink: SinkId, ptp_ts: u32, sample_index: usize);

    /// Per-packet bookkeeping hook; drives fill-level tracking and the media
    /// clock observation in the FIFO layer
    fn maintain(&mut self, sink: SinkId);

    /// Append one channel's samples
    fn strided_push(&mut self, sink: SinkId, samples: StridedSamples<'_>);
}

/// One channel's samples inside an interleaved 32-bit payload
///
/// Reads are bounds-checked at construction; iteration yields host-order
/// values.
#[derive(Debug, Clone, Copy)]
pub struct StridedSamples<'a> {
    payload: &'a [u8],
    channel: usize,
    stride: usize,
    frames: usize,
}

impl<'a> StridedSamples<'a> {
    /// Channel `channel` of `stride`-channel frames, at most `frames` of them
    ///
    /// The frame count is clamped to what `payload` actually holds.
    #[must_use]
    pub fn new(payload: &'a [u8], channel: usize, stride: usize, frames: usize) -> Self {
        let available = if stride == 0 || channel >= stride {
            0
        } else {
            payload.len() / (stride * SAMPLE_BYTES)
        };
        Self {
            payload,
            channel,
            stride,
            frames: frames.min(available),
        }
    }

    /// Channels per frame
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of samples (frames) for this channel
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames
    }

    /// No samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Sample of frame `frame`
    #[must_use]
    pub fn get(&self, frame: usize) -> Option<u32> {
        (frame < self.frames).then(|| {
            let offset = (frame * self.stride + self.channel) * SAMPLE_BYTES;
            BigEndian::read_u32(&self.payload[offset..offset + SAMPLE_BYTES])
        })
    }

    /// Iterate the samples in order
    pub fn iter(&self) -> impl Iterator<Item = u32> + 'a {
        let this = *self;
        (0..this.frames).map(move |frame| {
            let offset = (frame * this.stride + this.channel) * SAMPLE_BYTES;
            BigEndian::read_u32(&this.payload[offset..offset + SAMPLE_BYTES])
        })
    }
}

/// What the listener did with one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDisposition {
    /// Failed the conformance filter and was dropped
    Rejected(AvbtpDecodeError),
    /// Stream is disabled
    Inactive,
    /// Still acquiring; `chan_lock` consistent packets so far
    Acquiring {
        /// Lock counter after this packet
        chan_lock: u32,
    },
    /// This packet completed acquisition; it carries no output
    Locked {
        /// Detected rate, 0 when unknown
        rate: u32,
    },
    /// Samples handed to the sinks
    Delivered {
        /// Frames pushed per channel
        frames: usize,
    },
}

impl PacketDisposition {
    /// Whether samples reached the sinks
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}
