//! 1722 sequence number tracking
//!
//! Diagnostic only: a gap is logged and counted, the stream keeps its lock.

use std::collections::VecDeque;

/// Tracks 8-bit 1722 sequence numbers to detect gaps
#[derive(Debug)]
pub struct SequenceTracker {
    /// Last received sequence number
    last_seq: Option<u8>,
    /// Recent gap history
    recent_gaps: VecDeque<GapInfo>,
    /// Maximum history size
    max_history: usize,
    /// Total packets received
    packets_received: u64,
    /// Total discontinuities detected
    total_gaps: u64,
    /// Total packets estimated lost
    total_lost: u64,
}

/// A detected discontinuity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapInfo {
    /// Sequence number before the gap
    pub previous: u8,
    /// Sequence number after the gap
    pub current: u8,
    /// Packets missing between them; 0 for a repeat or reorder
    pub lost: u8,
}

impl SequenceTracker {
    /// Default gap history length
    pub const DEFAULT_HISTORY: usize = 16;

    /// Create a new sequence tracker
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_seq: None,
            recent_gaps: VecDeque::with_capacity(Self::DEFAULT_HISTORY),
            max_history: Self::DEFAULT_HISTORY,
            packets_received: 0,
            total_gaps: 0,
            total_lost: 0,
        }
    }

    /// Record a received packet, returning any detected gap
    ///
    /// Continuity means `(current - previous) mod 256 == 1`.
    pub fn record(&mut self, seq: u8) -> Option<GapInfo> {
        self.packets_received += 1;

        let gap = self.last_seq.and_then(|previous| {
            let step = seq.wrapping_sub(previous);
            if step == 1 {
                return None;
            }

            // A zero step is a repeat; steps in the upper half arrived late.
            let lost = if step < 0x80 {
                step.saturating_sub(1)
            } else {
                0
            };
            self.total_gaps += 1;
            self.total_lost += u64::from(lost);

            let gap = GapInfo {
                previous,
                current: seq,
                lost,
            };
            if self.recent_gaps.len() >= self.max_history {
                self.recent_gaps.pop_front();
            }
            self.recent_gaps.push_back(gap);
            Some(gap)
        });

        self.last_seq = Some(seq);
        gap
    }

    /// Last sequence number seen
    #[must_use]
    pub fn last_sequence(&self) -> Option<u8> {
        self.last_seq
    }

    /// Recent gaps, oldest first
    pub fn recent_gaps(&self) -> impl Iterator<Item = &GapInfo> {
        self.recent_gaps.iter()
    }

    /// Get packet loss ratio (0.0 to 1.0)
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Precision loss acceptable for ratio calculation"
    )]
    pub fn loss_ratio(&self) -> f64 {
        if self.packets_received == 0 {
            return 0.0;
        }
        let total = self.packets_received + self.total_lost;
        self.total_lost as f64 / total as f64
    }

    /// Get statistics
    #[must_use]
    pub fn stats(&self) -> SequenceStats {
        SequenceStats {
            packets_received: self.packets_received,
            total_gaps: self.total_gaps,
            total_lost: self.total_lost,
            loss_ratio: self.loss_ratio(),
        }
    }

    /// Reset the tracker
    pub fn reset(&mut self) {
        self.last_seq = None;
        self.recent_gaps.clear();
        self.packets_received = 0;
        self.total_gaps = 0;
        self.total_lost = 0;
    }
}

/// Statistics for sequence tracking
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStats {
    /// Total packets received
    pub packets_received: u64,
    /// Total discontinuities detected
    pub total_gaps: u64,
    /// Total packets estimated lost
    pub total_lost: u64,
    /// Loss ratio (0.0 to 1.0)
    pub loss_ratio: f64,
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
