//! Error Types for the DCA Simulator

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Simulation error types
///
/// Every stage fails fast with its own variant. Only [`SimulationError::NoData`]
/// is recovered locally, by re-sampling the entry date in the runner.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Sampling window or date range is infeasible
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// Provider returned zero observations for the requested range
    #[error("No price data for {instrument} between {start} and {end}")]
    NoData {
        instrument: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Every re-sampled entry date came back empty
    #[error("No price data after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error("Price series is empty")]
    EmptySeries,

    #[error("Monthly schedule is empty")]
    EmptySchedule,

    #[error("Simulation table is empty")]
    EmptyTable,

    #[error("Contribution must be positive, got {0}")]
    InvalidContribution(Decimal),

    #[error("Non-positive price {price} on {date}")]
    ZeroPrice { date: NaiveDate, price: Decimal },

    #[error("Total cost is zero")]
    ZeroCost,

    /// Decimal result outside the representable range
    #[error("Arithmetic overflow in {stage}: {detail}")]
    ArithmeticOverflow { stage: &'static str, detail: String },

    #[error("Elapsed time between entry and end date is zero")]
    ZeroHorizon,

    /// Compound-growth inversion has no real result
    #[error("Annualized return is undefined: {0}")]
    UndefinedAnnualization(String),

    /// Overall deadline around the fetch loop elapsed
    #[error("Deadline of {0:?} exceeded while fetching prices")]
    DeadlineExceeded(std::time::Duration),

    /// Transport or upstream failure in a price provider
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimulationError {
    /// Check if the runner may recover by re-sampling the entry date
    pub fn is_retryable(&self) -> bool {
        matches!(self, SimulationError::NoData { .. })
    }

    /// Name of the pipeline stage that raised this error
    pub fn stage(&self) -> &'static str {
        match self {
            SimulationError::InvalidRange(_) => "date_sampler",
            SimulationError::NoData { .. }
            | SimulationError::ExhaustedRetries { .. }
            | SimulationError::DeadlineExceeded(_)
            | SimulationError::Provider(_) => "price_provider",
            SimulationError::EmptySeries => "schedule_builder",
            SimulationError::EmptySchedule
            | SimulationError::InvalidContribution(_)
            | SimulationError::ZeroPrice { .. } => "simulator",
            SimulationError::EmptyTable
            | SimulationError::ZeroCost
            | SimulationError::ZeroHorizon
            | SimulationError::UndefinedAnnualization(_) => "metrics",
            SimulationError::ArithmeticOverflow { stage, .. } => stage,
            SimulationError::Config(_) => "config",
            SimulationError::Serialization(_) => "report",
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SimulationError::InvalidRange(_) => "INVALID_RANGE",
            SimulationError::NoData { .. } => "NO_DATA",
            SimulationError::ExhaustedRetries { .. } => "EXHAUSTED_RETRIES",
            SimulationError::EmptySeries => "EMPTY_SERIES",
            SimulationError::EmptySchedule => "EMPTY_SCHEDULE",
            SimulationError::EmptyTable => "EMPTY_TABLE",
            SimulationError::InvalidContribution(_) => "INVALID_CONTRIBUTION",
            SimulationError::ZeroPrice { .. } => "ZERO_PRICE",
            SimulationError::ZeroCost => "ZERO_COST",
            SimulationError::ArithmeticOverflow { .. } => "ARITHMETIC_OVERFLOW",
            SimulationError::ZeroHorizon => "ZERO_HORIZON",
            SimulationError::UndefinedAnnualization(_) => "UNDEFINED_ANNUALIZATION",
            SimulationError::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            SimulationError::Provider(_) => "PROVIDER_ERROR",
            SimulationError::Config(_) => "CONFIG_ERROR",
            SimulationError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
