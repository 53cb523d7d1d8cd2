//! Entry Date Sampling
//!
//! Draws a random entry date that leaves at least the minimum horizon
//! before the fixed end date.

use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::{DateRange, MinimumHorizon};

const SECONDS_PER_DAY: i64 = 86_400;

/// Random entry-date sampler over `[range_start, range_end - min_horizon]`
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DateSampler {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub min_horizon: MinimumHorizon,
}

impl DateSampler {
    pub fn new(range_start: NaiveDate, range_end: NaiveDate, min_horizon: MinimumHorizon) -> Self {
        Self {
            range_start,
            range_end,
            min_horizon,
        }
    }

    /// Feasible window of entry dates
    pub fn window(&self) -> Result<DateRange> {
        if self.range_end < self.range_start {
            return Err(SimulationError::InvalidRange(format!(
                "range end {} is before range start {}",
                self.range_end, self.range_start
            )));
        }

        let latest = self.min_horizon.before(self.range_end).ok_or_else(|| {
            SimulationError::InvalidRange(format!(
                "cannot subtract {} from {}",
                self.min_horizon, self.range_end
            ))
        })?;

        if latest < self.range_start {
            return Err(SimulationError::InvalidRange(format!(
                "no entry date between {} and {} leaves {} before the end date",
                self.range_start, self.range_end, self.min_horizon
            )));
        }

        DateRange::new(self.range_start, latest)
    }

    /// Sample using the thread-local random source
    pub fn sample(&self) -> Result<NaiveDate> {
        self.sample_with(&mut rand::rng())
    }

    /// Sample using the given random source
    ///
    /// Draws uniformly over seconds in the half-open window, then drops the
    /// time of day. A zero-length window yields its start date.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<NaiveDate> {
        let window = self.window()?;
        let span_secs = window.days() * SECONDS_PER_DAY;
        if span_secs == 0 {
            return Ok(window.start());
        }

        let offset_secs = rng.random_range(0..span_secs);
        let offset_days = u64::try_from(offset_secs / SECONDS_PER_DAY)
            .map_err(|_| SimulationError::InvalidRange("negative sampling offset".into()))?;

        let entry = window
            .start()
            .checked_add_days(Days::new(offset_days))
            .ok_or_else(|| SimulationError::InvalidRange("sampled date out of range".into()))?;

        tracing::debug!(%entry, window_start = %window.start(), window_end = %window.end(), "sampled entry date");
        Ok(entry)
    }
}

/// Sample an entry date in one call
pub fn sample(
    range_start: NaiveDate,
    range_end: NaiveDate,
    min_horizon: MinimumHorizon,
) -> Result<NaiveDate> {
    DateSampler::new(range_start, range_end, min_horizon).sample()
}
