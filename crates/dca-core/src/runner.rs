//! Simulation Runner
//!
//! Wires the pipeline together:
//!
//! ```text
//! DateSampler ──► PriceSeriesProvider ──► resample_monthly ──► DCASimulator ──► metrics::compute
//!      ▲                  │
//!      └── empty result ──┘   (bounded by max_attempts)
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::market::PriceSeriesProvider;
use crate::metrics;
use crate::model::PriceSeries;
use crate::report::SimulationReport;
use crate::sampler::DateSampler;
use crate::schedule::resample_monthly;
use crate::strategy::DCASimulator;

/// Entry date and data obtained by the sampling loop
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    pub entry_date: NaiveDate,
    pub series: PriceSeries,

    /// 1-based attempt that succeeded
    pub attempts: u32,
}

/// Runs complete simulations against a price provider
pub struct DcaRunner {
    provider: Arc<dyn PriceSeriesProvider>,
    config: SimulationConfig,
}

impl DcaRunner {
    pub fn new(provider: Arc<dyn PriceSeriesProvider>, config: SimulationConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run with a freshly seeded random source
    pub async fn run(&self) -> Result<SimulationReport> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.run_with(&mut rng).await
    }

    /// Run with a fixed seed, for reproducible entry dates
    pub async fn run_seeded(&self, seed: u64) -> Result<SimulationReport> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.run_with(&mut rng).await
    }

    /// Run the full pipeline using `rng` for entry-date sampling
    pub async fn run_with<R>(&self, rng: &mut R) -> Result<SimulationReport>
    where
        R: Rng + Send + ?Sized,
    {
        self.config.validate()?;
        let simulator = DCASimulator::new(self.config.monthly_amount)?;
        let end_date = self.config.range_end;

        let outcome = match self.config.deadline {
            Some(limit) => tokio::time::timeout(limit, self.fetch_with_resampling(rng))
                .await
                .map_err(|_| SimulationError::DeadlineExceeded(limit))??,
            None => self.fetch_with_resampling(rng).await?,
        };

        let schedule = resample_monthly(&outcome.series)?;
        let table = simulator.simulate(&schedule)?;
        let metrics = metrics::compute(&table, outcome.entry_date, end_date)?;

        tracing::info!(
            instrument = %self.config.instrument,
            entry_date = %outcome.entry_date,
            %end_date,
            periods = table.len(),
            total_return_pct = %metrics.total_return_pct.round_dp(2),
            annualized_return_pct = metrics.annualized_return_pct,
            "simulation complete"
        );

        Ok(SimulationReport {
            run_id: Uuid::new_v4(),
            instrument: self.config.instrument.clone(),
            entry_date: outcome.entry_date,
            end_date,
            monthly_amount: self.config.monthly_amount,
            attempts: outcome.attempts,
            table,
            metrics,
        })
    }

    /// Sample an entry date and fetch prices, re-sampling on empty results
    ///
    /// Gives up with `ExhaustedRetries` after `max_attempts` empty fetches.
    /// Any error other than an empty range is returned immediately.
    pub async fn fetch_with_resampling<R>(&self, rng: &mut R) -> Result<FetchOutcome>
    where
        R: Rng + Send + ?Sized,
    {
        let sampler = DateSampler::new(
            self.config.range_start,
            self.config.range_end,
            self.config.min_horizon,
        );
        let instrument = self.config.instrument.as_str();
        let end_date = self.config.range_end;
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            let entry_date = sampler.sample_with(rng)?;
            tracing::debug!(attempt, %entry_date, provider = self.provider.name(), "fetching prices");

            match self.provider.fetch(instrument, entry_date, end_date).await {
                Ok(series) if !series.is_empty() => {
                    tracing::info!(
                        attempt,
                        %entry_date,
                        observations = series.len(),
                        "fetched price series"
                    );
                    return Ok(FetchOutcome {
                        entry_date,
                        series,
                        attempts: attempt,
                    });
                }
                Ok(_) => {
                    tracing::warn!(attempt, max_attempts, %entry_date, "empty price series, re-sampling entry date");
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(attempt, max_attempts, %entry_date, "{}, re-sampling entry date", e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(SimulationError::ExhaustedRetries {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockPriceProvider;
    use crate::model::MinimumHorizon;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(instrument: &str) -> SimulationConfig {
        SimulationConfig {
            instrument: instrument.into(),
            ..SimulationConfig::default()
        }
    }

    /// Returns nothing for the first `empty_fetches` calls
    struct FlakyProvider {
        inner: MockPriceProvider,
        empty_fetches: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl PriceSeriesProvider for FlakyProvider {
        async fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.empty_fetches {
                return Ok(PriceSeries::default());
            }
            self.inner.fetch(instrument, start, end).await
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "Flaky"
        }
    }

    struct BrokenProvider;

    #[async_trait]
    impl PriceSeriesProvider for BrokenProvider {
        async fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<PriceSeries> {
            Err(SimulationError::Provider("connection refused".into()))
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl PriceSeriesProvider for SlowProvider {
        async fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<PriceSeries> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(PriceSeries::default())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "Slow"
        }
    }

    #[tokio::test]
    async fn test_end_to_end_run() {
        let runner = DcaRunner::new(Arc::new(MockPriceProvider::demo()), config("QQQ"));
        let report = runner.run_seeded(11).await.unwrap();

        assert_eq!(report.attempts, 1);
        assert!(report.entry_date >= date(2010, 1, 1));
        assert!(report.entry_date < date(2024, 11, 28));
        assert_eq!(report.end_date, date(2025, 2, 28));

        let last = report.table.last().unwrap();
        assert_eq!(report.metrics.total_cost, dec!(500) * rust_decimal::Decimal::from(report.table.len() as u64));
        assert_eq!(report.metrics.final_value, last.portfolio_value);
        // Upward drifting mock prices always end in profit
        assert!(report.metrics.total_return_pct > rust_decimal::Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let runner = DcaRunner::new(Arc::new(MockPriceProvider::demo()), config("SPY"));
        let a = runner.run_seeded(3).await.unwrap();
        let b = runner.run_seeded(3).await.unwrap();
        assert_eq!(a.entry_date, b.entry_date);
        assert_eq!(a.metrics, b.metrics);
        assert_ne!(a.run_id, b.run_id);
    }

    #[tokio::test]
    async fn test_empty_fetches_trigger_resampling() {
        let provider = FlakyProvider {
            inner: MockPriceProvider::demo(),
            empty_fetches: 3,
            calls: AtomicU32::new(0),
        };
        let runner = DcaRunner::new(Arc::new(provider), config("QQQ"));
        let report = runner.run_seeded(5).await.unwrap();
        assert_eq!(report.attempts, 4);
    }

    #[tokio::test]
    async fn test_exhausted_retries() {
        let runner = DcaRunner::new(
            Arc::new(MockPriceProvider::demo()),
            SimulationConfig {
                max_attempts: 7,
                ..config("DELISTED")
            },
        );
        let result = runner.run_seeded(1).await;
        assert!(matches!(result, Err(SimulationError::ExhaustedRetries { attempts: 7 })));
    }

    #[tokio::test]
    async fn test_provider_errors_are_not_retried() {
        let runner = DcaRunner::new(Arc::new(BrokenProvider), config("QQQ"));
        let result = runner.run_seeded(1).await;
        assert!(matches!(result, Err(SimulationError::Provider(_))));
    }

    #[tokio::test]
    async fn test_infeasible_window_fails_before_fetch() {
        let runner = DcaRunner::new(
            Arc::new(MockPriceProvider::demo()),
            SimulationConfig {
                range_start: date(2010, 1, 1),
                range_end: date(2010, 1, 1),
                min_horizon: MinimumHorizon::Months(3),
                ..config("QQQ")
            },
        );
        let result = runner.run_seeded(1).await;
        assert!(matches!(result, Err(SimulationError::InvalidRange(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let runner = DcaRunner::new(
            Arc::new(SlowProvider),
            SimulationConfig {
                deadline: Some(Duration::from_secs(5)),
                ..config("QQQ")
            },
        );
        let result = runner.run_seeded(1).await;
        assert!(matches!(result, Err(SimulationError::DeadlineExceeded(_))));
    }
}
