//! Mock Price Provider
//!
//! For testing and demo purposes. Serves in-memory or synthetic daily series.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::PriceSeriesProvider;
use crate::error::{Result, SimulationError};
use crate::model::{PriceObservation, PriceSeries};

/// Mock provider backed by fixed series per instrument
#[derive(Clone, Debug, Default)]
pub struct MockPriceProvider {
    series: HashMap<String, PriceSeries>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a full history for `instrument`
    pub fn with_series(mut self, instrument: &str, series: PriceSeries) -> Self {
        self.series.insert(instrument.to_uppercase(), series);
        self
    }

    /// Register a synthetic weekday history compounding by `daily_drift`
    pub fn with_synthetic(
        self,
        instrument: &str,
        listed: NaiveDate,
        delisted: NaiveDate,
        start_price: Decimal,
        daily_drift: Decimal,
    ) -> Self {
        let series = synthetic_series(listed, delisted, start_price, daily_drift);
        self.with_series(instrument, series)
    }

    /// Demo universe with roughly realistic long-run growth
    pub fn demo() -> Self {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap_or_default();
        Self::new()
            .with_synthetic("QQQ", d(2010, 1, 4), d(2025, 4, 7), dec!(46.69), dec!(0.0006))
            .with_synthetic("SPY", d(2010, 1, 4), d(2025, 4, 7), dec!(113.33), dec!(0.0004))
            .with_synthetic("BRK.B", d(2010, 1, 4), d(2025, 4, 7), dec!(66.22), dec!(0.0005))
            // Listed late in the range: early entry dates still see data from listing onward
            .with_synthetic("ARKK", d(2014, 10, 31), d(2025, 4, 7), dec!(20.00), dec!(0.0003))
    }
}

/// Weekday prices from `listed` up to and including `delisted`
pub fn synthetic_series(
    listed: NaiveDate,
    delisted: NaiveDate,
    start_price: Decimal,
    daily_drift: Decimal,
) -> PriceSeries {
    let growth = Decimal::ONE + daily_drift;
    let mut price = start_price;
    let mut observations = Vec::new();

    for date in listed.iter_days().take_while(|d| *d <= delisted) {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        observations.push(PriceObservation::new(date, price.round_dp(4)));
        price *= growth;
    }

    PriceSeries::new(observations)
}

#[async_trait]
impl PriceSeriesProvider for MockPriceProvider {
    async fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let no_data = || SimulationError::NoData {
            instrument: instrument.to_string(),
            start,
            end,
        };

        let full = self.series.get(&instrument.to_uppercase()).ok_or_else(no_data)?;
        let series = full.between(start, end);
        if series.is_empty() {
            return Err(no_data());
        }
        Ok(series)
    }

    async fn health_check(&self) -> bool {
        true // Mock always healthy
    }

    fn name(&self) -> &str {
        "MockPrices"
    }
}
