//! Domain Models
//!
//! Core data types flowing through the simulation pipeline.
//! Uses `rust_decimal` for all monetary values and share counts - never use f64 for money!

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// An inclusive calendar date range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(SimulationError::InvalidRange(format!(
                "end {end} is before start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between start and end
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Minimum time that must remain between an entry date and the end date
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumHorizon {
    /// Calendar months
    Months(u32),
    Days(u32),
}

impl Default for MinimumHorizon {
    fn default() -> Self {
        MinimumHorizon::Months(3)
    }
}

impl MinimumHorizon {
    /// `date - horizon`, or `None` when it falls outside chrono's calendar
    pub fn before(&self, date: NaiveDate) -> Option<NaiveDate> {
        match *self {
            MinimumHorizon::Months(n) => date.checked_sub_months(Months::new(n)),
            MinimumHorizon::Days(n) => date.checked_sub_days(Days::new(u64::from(n))),
        }
    }
}

impl std::fmt::Display for MinimumHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MinimumHorizon::Months(n) => write!(f, "{n} months"),
            MinimumHorizon::Days(n) => write!(f, "{n} days"),
        }
    }
}

/// A single dated price
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub price: Decimal,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}

/// Time-ordered price observations, strictly increasing by date
///
/// Construction sorts by date and keeps the first observation for a repeated date.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PriceObservation>", into = "Vec<PriceObservation>")]
pub struct PriceSeries {
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    pub fn new(mut observations: Vec<PriceObservation>) -> Self {
        observations.sort_by_key(|o| o.date);
        observations.dedup_by_key(|o| o.date);
        Self { observations }
    }

    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceObservation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&PriceObservation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&PriceObservation> {
        self.observations.last()
    }

    /// Observations with `start <= date < end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start && o.date < end)
                .copied()
                .collect(),
        }
    }
}

impl From<Vec<PriceObservation>> for PriceSeries {
    fn from(observations: Vec<PriceObservation>) -> Self {
        Self::new(observations)
    }
}

impl From<PriceSeries> for Vec<PriceObservation> {
    fn from(series: PriceSeries) -> Self {
        series.observations
    }
}

/// One price per calendar month, ascending
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    entries: Vec<PriceObservation>,
}

impl MonthlySchedule {
    /// Caller guarantees one entry per month in ascending order
    pub(crate) fn from_sorted(entries: Vec<PriceObservation>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PriceObservation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One period of the DCA plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRow {
    /// 1-based period number
    pub period_index: u32,

    /// Purchase date
    pub date: NaiveDate,

    /// Purchase price
    pub price: Decimal,

    /// contribution / price
    pub shares_bought: Decimal,

    /// Running sum of shares bought
    pub cumulative_shares: Decimal,

    /// contribution * period_index
    pub cumulative_invested: Decimal,

    /// Mark-to-market value at this period's price
    pub portfolio_value: Decimal,
}

/// Per-period results, aligned with the monthly schedule
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTable {
    rows: Vec<SimulationRow>,
}

impl SimulationTable {
    pub(crate) fn from_rows(rows: Vec<SimulationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SimulationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&SimulationRow> {
        self.rows.last()
    }
}

/// Summary figures for a finished run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Portfolio value at the last period
    pub final_value: Decimal,

    /// Cumulative amount invested at the last period
    pub total_cost: Decimal,

    /// (final_value - total_cost) / total_cost * 100
    pub total_return_pct: Decimal,

    /// Whole days from entry date to end date
    pub elapsed_days: i64,

    /// elapsed_days / 365
    pub elapsed_years: f64,

    /// Constant yearly compounding rate, in percent
    pub annualized_return_pct: f64,
}
