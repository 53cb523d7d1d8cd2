//! Monthly Schedule Builder
//!
//! Resamples a raw price series to one purchase price per calendar month:
//! the earliest observation on or after the first day of each month.
//! Months without any observation are skipped, never forward-filled.

use chrono::Datelike;

use crate::error::{Result, SimulationError};
use crate::model::{MonthlySchedule, PriceObservation, PriceSeries};

/// Resample `series` to the first available observation of each month
pub fn resample_monthly(series: &PriceSeries) -> Result<MonthlySchedule> {
    if series.is_empty() {
        return Err(SimulationError::EmptySeries);
    }

    let mut entries: Vec<PriceObservation> = Vec::new();
    for obs in series.iter() {
        let same_month = entries
            .last()
            .is_some_and(|prev| (prev.date.year(), prev.date.month()) == (obs.date.year(), obs.date.month()));
        if !same_month {
            entries.push(*obs);
        }
    }

    tracing::debug!(
        observations = series.len(),
        months = entries.len(),
        "resampled price series to monthly schedule"
    );

    Ok(MonthlySchedule::from_sorted(entries))
}
