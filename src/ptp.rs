//! Local timer to PTP time translation.
//!
//! The gPTP service itself lives outside this crate. The talker only needs
//! a way to turn a local reference-timer value into a 32-bit PTP nanosecond
//! time, which is what the 1722 presentation timestamp carries.

use serde::{Deserialize, Serialize};

/// Translates local reference-timer ticks to PTP nanoseconds mod 2^32
pub trait PtpTranslator {
    /// PTP time, in nanoseconds mod 2^32, of local timer value `local_ts`
    fn local_to_ptp(&self, local_ts: u32) -> u32;
}

impl<F> PtpTranslator for F
where
    F: Fn(u32) -> u32,
{
    fn local_to_ptp(&self, local_ts: u32) -> u32 {
        self(local_ts)
    }
}

/// A sampled correspondence between the local timer and PTP time
///
/// Extrapolates from one reference pair at a fixed tick period, corrected
/// by the rate difference the time-sync service measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtpTimeInfo {
    /// Local timer value of the reference point
    pub local_ts: u32,
    /// PTP nanoseconds (mod 2^32) of the reference point
    pub ptp_ts: u32,
    /// Nominal nanoseconds per local timer tick
    pub ns_per_tick: u32,
    /// Local clock rate error against the grandmaster, parts per billion
    pub rate_adjust_ppb: i32,
}

impl PtpTimeInfo {
    /// Default local timer tick: 10 ns (100 MHz reference)
    pub const DEFAULT_NS_PER_TICK: u32 = 10;

    /// Reference pair with the default tick and no rate correction
    #[must_use]
    pub fn new(local_ts: u32, ptp_ts: u32) -> Self {
        Self {
            local_ts,
            ptp_ts,
            ns_per_tick: Self::DEFAULT_NS_PER_TICK,
            rate_adjust_ppb: 0,
        }
    }

    /// Set rate correction
    #[must_use]
    pub fn with_rate_adjust(mut self, ppb: i32) -> Self {
        self.rate_adjust_ppb = ppb;
        self
    }
}

impl PtpTranslator for PtpTimeInfo {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn local_to_ptp(&self, local_ts: u32) -> u32 {
        // Signed tick delta so timestamps slightly before the reference work.
        let ticks = i64::from(local_ts.wrapping_sub(self.local_ts) as i32);
        let nanos = ticks * i64::from(self.ns_per_tick);
        let correction = nanos * i64::from(self.rate_adjust_ppb) / 1_000_000_000;
        self.ptp_ts.wrapping_add((nanos + correction) as u32)
    }
}
