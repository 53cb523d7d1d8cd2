//! Simulation Configuration

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::MinimumHorizon;

/// Default cap on entry-date re-sampling when the provider has no data
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Parameters of a single simulation run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Ticker symbol (e.g., "QQQ")
    pub instrument: String,

    /// Amount invested every month (USD)
    pub monthly_amount: Decimal,

    /// Earliest possible entry date
    pub range_start: NaiveDate,

    /// Fixed end date of the simulation
    pub range_end: NaiveDate,

    /// Time that must remain between entry and end date
    pub min_horizon: MinimumHorizon,

    /// Entry dates tried before giving up on an empty data source
    pub max_attempts: u32,

    /// Overall deadline for sampling and fetching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            instrument: "QQQ".into(),
            monthly_amount: dec!(500),
            range_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            range_end: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap_or_default(),
            min_horizon: MinimumHorizon::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            deadline: None,
        }
    }
}

impl SimulationConfig {
    /// Load from `DCA_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            instrument: lookup("DCA_INSTRUMENT")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or(defaults.instrument),
            monthly_amount: parse_or(&lookup, "DCA_MONTHLY_AMOUNT", defaults.monthly_amount)?,
            range_start: parse_or(&lookup, "DCA_RANGE_START", defaults.range_start)?,
            range_end: parse_or(&lookup, "DCA_RANGE_END", defaults.range_end)?,
            min_horizon: lookup("DCA_MIN_HORIZON_MONTHS")
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map(MinimumHorizon::Months)
                        .map_err(|e| invalid("DCA_MIN_HORIZON_MONTHS", &raw, e))
                })
                .transpose()?
                .unwrap_or(defaults.min_horizon),
            max_attempts: parse_or(&lookup, "DCA_MAX_ATTEMPTS", defaults.max_attempts)?,
            deadline: lookup("DCA_DEADLINE_SECS")
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map(Duration::from_secs)
                        .map_err(|e| invalid("DCA_DEADLINE_SECS", &raw, e))
                })
                .transpose()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.instrument.is_empty() {
            return Err(SimulationError::Config("instrument must not be empty".into()));
        }
        if self.monthly_amount <= Decimal::ZERO {
            return Err(SimulationError::Config(format!(
                "monthly amount must be positive, got {}",
                self.monthly_amount
            )));
        }
        if self.max_attempts == 0 {
            return Err(SimulationError::Config("max attempts must be at least 1".into()));
        }
        if self.range_end < self.range_start {
            return Err(SimulationError::InvalidRange(format!(
                "range end {} is before range start {}",
                self.range_end, self.range_start
            )));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(key, &raw, e)),
        None => Ok(default),
    }
}

fn invalid(key: &str, raw: &str, err: impl std::fmt::Display) -> SimulationError {
    SimulationError::Config(format!("{key}={raw:?}: {err}"))
}
