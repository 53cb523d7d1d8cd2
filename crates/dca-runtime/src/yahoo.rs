//! Yahoo Finance Price Provider
//!
//! Implementation of `PriceSeriesProvider` on the public chart API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;

use dca_core::{
    error::{Result, SimulationError},
    market::PriceSeriesProvider,
    model::{PriceObservation, PriceSeries},
};

/// Yahoo provider configuration
#[derive(Clone, Debug)]
pub struct YahooConfig {
    /// API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Use split/dividend adjusted closes when available
    pub adjusted: bool,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".into(),
            timeout_secs: 15,
            adjusted: true,
        }
    }
}

impl YahooConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("YAHOO_BASE_URL")
            .unwrap_or(defaults.base_url);
        let timeout_secs = std::env::var("YAHOO_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(defaults.timeout_secs);
        let adjusted = std::env::var("YAHOO_ADJUSTED")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(defaults.adjusted);

        Self {
            base_url,
            timeout_secs,
            adjusted,
        }
    }
}

/// Yahoo Finance daily close provider
pub struct YahooPriceProvider {
    client: reqwest::Client,
    config: YahooConfig,
}

impl YahooPriceProvider {
    /// Create from configuration
    pub fn from_config(config: YahooConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("dca-runtime/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SimulationError::Config(format!("http client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(YahooConfig::from_env())
    }

    fn chart_url(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=div%2Csplit",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(instrument),
            unix_midnight(start),
            unix_midnight(end),
        )
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Parse a chart response body into observations with `start <= date < end`
fn parse_chart(
    body: &str,
    instrument: &str,
    start: NaiveDate,
    end: NaiveDate,
    adjusted: bool,
) -> Result<PriceSeries> {
    let no_data = || SimulationError::NoData {
        instrument: instrument.to_string(),
        start,
        end,
    };

    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(no_data());
        }
        return Err(SimulationError::Provider(format!(
            "yahoo chart error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(no_data());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let offset = result.meta.map(|m| m.gmtoffset).unwrap_or_default();

    let closes: Vec<Option<f64>> = match (adjusted, result.indicators.adjclose) {
        (true, Some(adj)) if !adj.is_empty() => adj.into_iter().next().map(|a| a.adjclose).unwrap_or_default(),
        _ => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let observations: Vec<PriceObservation> = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            let price = Decimal::from_f64(close?)?.round_dp(6);
            (price > Decimal::ZERO && date >= start && date < end)
                .then(|| PriceObservation::new(date, price))
        })
        .collect();

    if observations.is_empty() {
        return Err(no_data());
    }

    Ok(PriceSeries::new(observations))
}

#[async_trait]
impl PriceSeriesProvider for YahooPriceProvider {
    async fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let url = self.chart_url(instrument, start, end);
        tracing::debug!(%url, "requesting yahoo chart");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SimulationError::Provider(format!("yahoo transport error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SimulationError::Provider(format!("yahoo body error: {e}")))?;

        // 404 carries a chart error body for unknown or delisted symbols
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(SimulationError::Provider(format!("yahoo returned status {status}")));
        }

        let series = parse_chart(&body, instrument, start, end, self.config.adjusted)?;
        tracing::debug!(instrument, observations = series.len(), "parsed yahoo chart");
        Ok(series)
    }

    async fn health_check(&self) -> bool {
        let url = format!(
            "{}/v8/finance/chart/SPY?range=1d&interval=1d",
            self.config.base_url.trim_end_matches('/')
        );
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!("Yahoo health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "Yahoo"
    }
}
