//! Audio sink that records every call

use std::collections::HashMap;

use crate::listener::{AudioSink, StridedSamples};
use crate::types::SinkId;

/// One call made on a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// `set_timestamp`
    Timestamp {
        /// Target sink
        sink: SinkId,
        /// Presentation time
        ptp_ts: u32,
        /// Sample the time applies to
        sample_index: usize,
    },
    /// `maintain`
    Maintain(SinkId),
    /// `strided_push`, samples copied out
    Push {
        /// Target sink
        sink: SinkId,
        /// Host-order samples
        samples: Vec<u32>,
    },
}

/// In-memory sink for listener tests
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
    fifos: HashMap<SinkId, Vec<u32>>,
}

impl RecordingSink {
    /// Empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls in order
    #[must_use]
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Everything pushed to `sink`
    #[must_use]
    pub fn samples(&self, sink: SinkId) -> &[u32] {
        self.fifos.get(&sink).map_or(&[][..], Vec::as_slice)
    }

    /// Timestamps set on `sink`
    #[must_use]
    pub fn timestamps(&self, sink: SinkId) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Timestamp { sink: s, ptp_ts, .. } if *s == sink => Some(*ptp_ts),
                _ => None,
            })
            .collect()
    }

    /// Number of `maintain` calls on `sink`
    #[must_use]
    pub fn maintain_count(&self, sink: SinkId) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SinkEvent::Maintain(s) if *s == sink))
            .count()
    }

    /// Forget everything recorded
    pub fn clear(&mut self) {
        self.events.clear();
        self.fifos.clear();
    }
}

impl AudioSink for RecordingSink {
    fn set_timestamp(&mut self, sink: SinkId, ptp_ts: u32, sample_index: usize) {
        self.events.push(SinkEvent::Timestamp {
            sink,
            ptp_ts,
            sample_index,
        });
    }

    fn maintain(&mut self, sink: SinkId) {
        self.events.push(SinkEvent::Maintain(sink));
    }

    fn strided_push(&mut self, sink: SinkId, samples: StridedSamples<'_>) {
        let samples: Vec<u32> = samples.iter().collect();
        self.fifos
            .entry(sink)
            .or_default()
            .extend_from_slice(&samples);
        self.events.push(SinkEvent::Push { sink, samples });
    }
}
