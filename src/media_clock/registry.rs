//! Media clocks keyed by clock index

use std::collections::HashMap;

use super::{ClockType, MediaClockRecovery, RecoveryConfig, StreamObservation};
use crate::error::{Avb1722Error, Result};

/// All media clocks of one unit
#[derive(Debug, Default)]
pub struct MediaClocks {
    config: RecoveryConfig,
    clocks: HashMap<u32, MediaClockRecovery>,
}

impl MediaClocks {
    /// Registry using `config` for every clock it initialises
    #[must_use]
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            clocks: HashMap::new(),
        }
    }

    /// (Re)initialise clock `index` at nominal `rate`
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::MediaClock` for an unsupported rate or bad
    /// tuning; the clock is left untouched in that case.
    pub fn init(&mut self, index: u32, rate: u32) -> Result<()> {
        let clock = MediaClockRecovery::new(rate, self.config).inspect_err(|e| {
            tracing::warn!(clock = index, rate, error = %e, "Media clock init failed");
        })?;
        self.clocks.insert(index, clock);
        Ok(())
    }

    fn clock_mut(&mut self, index: u32) -> Result<&mut MediaClockRecovery> {
        self.clocks
            .get_mut(&index)
            .ok_or(Avb1722Error::UnknownClock(index))
    }

    /// Record an observation for clock `index`
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownClock` if the clock is not initialised.
    pub fn observe(&mut self, index: u32, observation: StreamObservation) -> Result<()> {
        self.clock_mut(index)?.observe(observation);
        Ok(())
    }

    /// Tell clock `index` its stream has just locked
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownClock` if the clock is not initialised.
    pub fn inform_of_lock(&mut self, index: u32) -> Result<()> {
        self.clock_mut(index)?.inform_of_lock();
        Ok(())
    }

    /// Advance clock `index` and return its external wordlen
    ///
    /// # Errors
    ///
    /// Returns `Avb1722Error::UnknownClock` if the clock is not initialised.
    pub fn compute(&mut self, index: u32, clock_type: ClockType) -> Result<u32> {
        Ok(self.clock_mut(index)?.compute(clock_type))
    }

    /// State of clock `index`
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&MediaClockRecovery> {
        self.clocks.get(&index)
    }
}
