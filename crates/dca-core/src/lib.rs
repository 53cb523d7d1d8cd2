//! # dca-core
//!
//! Backtests a fixed-amount monthly dollar-cost averaging plan on one
//! instrument, starting from a randomly sampled entry date.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   entry   ┌─────────────────────┐  daily   ┌──────────────────┐
//! │ DateSampler  │──────────►│ PriceSeriesProvider │─────────►│ resample_monthly │
//! └──────────────┘           └─────────────────────┘          └────────┬─────────┘
//!        ▲   empty series → re-sample     │                            │ monthly
//!        └────────────────────────────────┘                            ▼
//!                          ┌─────────────────┐   table   ┌──────────────────────┐
//!                          │ metrics::compute│◄──────────│ DCASimulator         │
//!                          └─────────────────┘           └──────────────────────┘
//! ```
//!
//! ## Example: $500/month into QQQ
//!
//! ```text
//! Period  Date        Price    Shares   Invested   Value
//!      1  2020-01-02  100.00   5.0000        500    500.00
//!      2  2020-02-03  200.00   2.5000       1000   1500.00
//!
//! Total return 50.00%, annualized over (end - entry) days / 365
//! ```

pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod model;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod schedule;
pub mod strategy;

pub use config::SimulationConfig;
pub use error::{Result, SimulationError};
pub use market::{MockPriceProvider, PriceSeriesProvider};
pub use model::{
    DateRange, Metrics, MinimumHorizon, MonthlySchedule, PriceObservation, PriceSeries,
    SimulationRow, SimulationTable,
};
pub use report::{JsonReportRenderer, ReportRenderer, SimulationReport, TextReportRenderer};
pub use runner::DcaRunner;
pub use sampler::DateSampler;
pub use schedule::resample_monthly;
pub use strategy::{DCASimulator, simulate};
