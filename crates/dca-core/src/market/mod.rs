//! Market Data
//!
//! Abstraction over historical daily price sources.

mod mock;

pub use mock::MockPriceProvider;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::model::PriceSeries;

/// Price series provider trait (Strategy pattern)
///
/// Implement this for each data vendor: Yahoo, Stooq, a local CSV cache, etc.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Daily prices for `instrument` with `start <= date < end`
    ///
    /// Fails with `SimulationError::NoData` when the range holds no observations.
    async fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;

    /// Check if the source is reachable
    async fn health_check(&self) -> bool;

    /// Provider name
    fn name(&self) -> &str;
}
