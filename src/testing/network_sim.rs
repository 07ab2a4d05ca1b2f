//! Link impairment simulation for testing

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Applies loss, duplication and reordering to a sequence of frames
///
/// Seeded, so a failing test replays the same impairments.
#[derive(Clone, Debug)]
pub struct NetworkSimulator {
    /// Packet loss probability (0.0 to 1.0)
    pub loss_rate: f64,
    /// Probability a frame is delivered twice
    pub duplicate_rate: f64,
    /// Probability a frame swaps places with the next one
    pub reorder_rate: f64,
    rng: StdRng,
}

impl NetworkSimulator {
    /// Perfect link (no issues)
    #[must_use]
    pub fn perfect() -> Self {
        Self::with_rates(0.0, 0.0, 0.0, 0)
    }

    /// Lightly loaded switched network
    #[must_use]
    pub fn lossy(seed: u64) -> Self {
        Self::with_rates(0.01, 0.0, 0.0, seed)
    }

    /// Very poor conditions (stress test)
    #[must_use]
    pub fn stress_test(seed: u64) -> Self {
        Self::with_rates(0.10, 0.02, 0.05, seed)
    }

    /// Explicit rates with a fixed seed
    #[must_use]
    pub fn with_rates(loss_rate: f64, duplicate_rate: f64, reorder_rate: f64, seed: u64) -> Self {
        Self {
            loss_rate,
            duplicate_rate,
            reorder_rate,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Should this frame be dropped?
    pub fn should_drop(&mut self) -> bool {
        self.loss_rate > 0.0 && self.rng.gen_bool(self.loss_rate.min(1.0))
    }

    /// Should this frame be delivered twice?
    pub fn should_duplicate(&mut self) -> bool {
        self.duplicate_rate > 0.0 && self.rng.gen_bool(self.duplicate_rate.min(1.0))
    }

    /// Should this frame be reordered?
    pub fn should_reorder(&mut self) -> bool {
        self.reorder_rate > 0.0 && self.rng.gen_bool(self.reorder_rate.min(1.0))
    }

    /// Pass `frames` through the simulated link
    pub fn transmit(&mut self, frames: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(frames.len());
        for frame in frames {
            if self.should_drop() {
                continue;
            }
            if self.should_duplicate() {
                out.push(frame.clone());
            }
            out.push(frame);
        }

        let mut i = 0;
        while i + 1 < out.len() {
            if self.should_reorder() {
                out.swap(i, i + 1);
                i += 2;
            } else {
                i += 1;
            }
        }
        out
    }
}

impl Default for NetworkSimulator {
    fn default() -> Self {
        Self::perfect()
    }
}
