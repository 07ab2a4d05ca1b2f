//! PI media clock recovery.
//!
//! Turns pairs of stream observations into a sample-period estimate
//! ("wordlen") in local reference-timer ticks. The error signal is how far
//! the presentation time of the sample leaving the FIFO lags the PTP time
//! at which it actually left:
//!
//! ```text
//! e      = outgoing_ptp_ts - presentation_ts          (ns, signed)
//! ierror = clamp(ierror + e << F, ±(2^30 << F))
//! wordlen -= Kp * (Δe / Δlocal) + Ki * (ierror / Δlocal)
//! ```
//!
//! A positive error means samples are consumed late, so the period shrinks.

use serde::{Deserialize, Serialize};

use super::MediaClockError;
use super::config::RecoveryConfig;

/// How the pacing consumer's clock is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockType {
    /// Free-running at the nominal rate
    #[default]
    LocalClock,
    /// Recovered from an incoming stream's timestamps
    InputStreamDerived,
}

/// One report from the FIFO layer about a received stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamObservation {
    /// Local timer value when the report was taken
    pub local_ts: u32,
    /// PTP time (ns mod 2^32) at which the reported sample left the FIFO
    pub outgoing_ptp_ts: u32,
    /// Presentation time (ns mod 2^32) that sample was stamped with
    pub presentation_ts: u32,
    /// Whether the FIFO is locked to the stream
    pub locked: bool,
    /// FIFO fill level, informational
    pub fill: i32,
}

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    /// No reference observation
    Cold,
    /// One observation held, next one starts tracking
    Warm,
    /// Controller active
    Tracking,
}

/// Media clock recovery for one clock.
///
/// `observe` is called by the observation producer, `compute` by the
/// periodic pacing consumer. Each owns one end of the pending slot; the
/// pair is never advanced concurrently.
#[derive(Debug, Clone)]
pub struct MediaClockRecovery {
    config: RecoveryConfig,
    rate: u32,
    nominal: u64,
    /// Sample period, `F` fractional bits
    wordlen: u64,
    /// Integral error accumulator, `F` fractional bits
    ierror: i64,
    /// Error of the last tracked observation, `F` fractional bits
    perror: i64,
    first: bool,
    previous: Option<StreamObservation>,
    pending: Option<StreamObservation>,
}

/// Nominal sample period for `rate` in `F`-bit fixed point
///
/// Rates in the 48 kHz family use the 48 kHz period, the 44.1 kHz family
/// the 44.1 kHz one; 0 means "not configured" and yields 0.
///
/// # Errors
///
/// Returns `MediaClockError::UnsupportedSampleRate` for any other rate.
pub fn nominal_wordlen(rate: u32, config: &RecoveryConfig) -> Result<u64, MediaClockError> {
    let base = match rate {
        0 => return Ok(0),
        r if r % 48_000 == 0 => 48_000,
        r if r % 44_100 == 0 => 44_100,
        r => return Err(MediaClockError::UnsupportedSampleRate(r)),
    };
    let ref_clock = u64::from(config.ref_clock_hz);
    Ok((ref_clock << config.fractional_bits) / base)
}

impl MediaClockRecovery {
    /// Integral clamp before fractional scaling
    pub const IERROR_LIMIT: i64 = 1 << 30;

    /// Initialise recovery for a nominal `rate`
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedSampleRate` if `rate` is in neither rate family,
    /// or `InvalidConfig` if `config` does not validate.
    pub fn new(rate: u32, config: RecoveryConfig) -> Result<Self, MediaClockError> {
        config.validate()?;
        let nominal = nominal_wordlen(rate, &config)?;

        tracing::debug!(
            rate,
            nominal_wordlen = nominal,
            "Media clock recovery initialised"
        );
        Ok(Self {
            config,
            rate,
            nominal,
            wordlen: nominal,
            ierror: 0,
            perror: 0,
            first: true,
            previous: None,
            pending: None,
        })
    }

    /// Store the newest observation, replacing any not yet consumed
    pub fn observe(&mut self, observation: StreamObservation) {
        self.pending = Some(observation);
    }

    /// Drop the pending observation; the FIFO has just (re)locked
    pub fn inform_of_lock(&mut self) {
        self.pending = None;
    }

    /// Advance the controller and return the external wordlen
    ///
    /// With [`ClockType::LocalClock`] this returns the nominal wordlen and
    /// changes nothing.
    pub fn compute(&mut self, clock_type: ClockType) -> u32 {
        match clock_type {
            ClockType::LocalClock => self.to_external(self.nominal),
            ClockType::InputStreamDerived => {
                self.update();
                self.to_external(self.wordlen)
            }
        }
    }

    fn update(&mut self) {
        let Some(current) = self.pending.take() else {
            return;
        };

        if !current.locked {
            if self.previous.is_some() || self.wordlen != self.nominal {
                tracing::debug!(
                    rate = self.rate,
                    "Stream unlocked, media clock reset to nominal"
                );
            }
            self.reset();
            return;
        }

        let Some(previous) = self.previous.replace(current) else {
            return;
        };

        let diff_local = i128::from(current.local_ts.wrapping_sub(previous.local_ts));
        if diff_local == 0 {
            return;
        }

        let (outgoing, presented) = (current.outgoing_ptp_ts, current.presentation_ts);
        #[allow(clippy::cast_possible_wrap)]
        let error = i64::from(outgoing.wrapping_sub(presented) as i32);
        let error = i128::from(error) << self.config.fractional_bits;

        let (perror_delta, ierror) = if self.first {
            self.first = false;
            (0, 0)
        } else {
            let limit = i128::from(Self::IERROR_LIMIT) << self.config.fractional_bits;
            (
                error - i128::from(self.perror),
                (error + i128::from(self.ierror)).clamp(-limit, limit),
            )
        };

        // Both fit in i64 for F <= 32: |error| <= 2^63 and ierror is clamped.
        self.perror = i64::try_from(error).unwrap_or_default();
        self.ierror = i64::try_from(ierror).unwrap_or_default();

        let proportional = self.config.kp.apply(perror_delta / diff_local);
        let integral = self.config.ki.apply(ierror / diff_local);
        let correction = proportional.saturating_add(integral);
        let wordlen = i128::from(self.wordlen).saturating_sub(correction);
        self.wordlen = u64::try_from(wordlen.max(0)).unwrap_or(u64::MAX);

        tracing::trace!(
            diff_local = %diff_local,
            error_ns = %(error >> self.config.fractional_bits),
            ierror = self.ierror,
            wordlen = self.wordlen,
            fill = current.fill,
            "Media clock update"
        );
    }

    /// Back to nominal with no reference observation
    fn reset(&mut self) {
        self.wordlen = self.nominal;
        self.ierror = 0;
        self.perror = 0;
        self.first = true;
        self.previous = None;
    }

    fn to_external(&self, wordlen: u64) -> u32 {
        let shift = self.config.fractional_bits - self.config.external_fractional_bits;
        u32::try_from(wordlen >> shift).unwrap_or(u32::MAX)
    }

    /// Controller phase
    #[must_use]
    pub fn state(&self) -> RecoveryState {
        match (self.previous, self.first) {
            (None, _) => RecoveryState::Cold,
            (Some(_), true) => RecoveryState::Warm,
            (Some(_), false) => RecoveryState::Tracking,
        }
    }

    /// Nominal rate in Hz, 0 when unconfigured
    #[must_use]
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Current internal wordlen (`F` fractional bits)
    #[must_use]
    pub fn wordlen(&self) -> u64 {
        self.wordlen
    }

    /// Internal wordlen for the nominal rate
    #[must_use]
    pub fn nominal_wordlen(&self) -> u64 {
        self.nominal
    }

    /// Integral error accumulator (`F` fractional bits)
    #[must_use]
    pub fn integral_error(&self) -> i64 {
        self.ierror
    }

    /// Whether an observation is waiting for `compute`
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Tuning in use
    #[must_use]
    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }
}
