//! HTTP Handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dca_core::{
    report::{ChartSeries, ReportRenderer, TextReportRenderer},
    DcaRunner, MinimumHorizon, SimulationConfig, SimulationError, SimulationReport,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_healthy: bool,
}

/// Overrides for a single run; anything omitted uses the server defaults
#[derive(Debug, Default, Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub instrument: Option<String>,
    /// JSON number or string; strings keep every digit
    #[serde(default)]
    pub monthly_amount: Option<Decimal>,
    #[serde(default)]
    pub range_start: Option<NaiveDate>,
    #[serde(default)]
    pub range_end: Option<NaiveDate>,
    #[serde(default)]
    pub min_horizon_months: Option<u32>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Fixed seed for a reproducible entry date
    #[serde(default)]
    pub seed: Option<u64>,
    /// Append the per-period table to the summary text
    #[serde(default)]
    pub include_table: bool,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub artifact: String,
    pub summary: String,
    pub chart: ChartSeries,
    pub report: SimulationReport,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub stage: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &SimulationError) -> ApiError {
    let status = match err {
        SimulationError::InvalidRange(_)
        | SimulationError::InvalidContribution(_)
        | SimulationError::Config(_) => StatusCode::BAD_REQUEST,
        SimulationError::NoData { .. } | SimulationError::ExhaustedRetries { .. } => StatusCode::NOT_FOUND,
        SimulationError::EmptySeries
        | SimulationError::EmptySchedule
        | SimulationError::EmptyTable
        | SimulationError::ZeroPrice { .. }
        | SimulationError::ZeroCost
        | SimulationError::ZeroHorizon
        | SimulationError::ArithmeticOverflow { .. }
        | SimulationError::UndefinedAnnualization(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SimulationError::Provider(_) => StatusCode::BAD_GATEWAY,
        SimulationError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        SimulationError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code().into(),
            stage: err.stage().into(),
        }),
    )
}

impl SimulateRequest {
    /// Merge overrides onto `defaults`
    fn into_config(self, defaults: &SimulationConfig) -> Result<SimulationConfig, SimulationError> {
        let mut config = defaults.clone();

        if let Some(instrument) = self.instrument {
            config.instrument = instrument.trim().to_uppercase();
        }
        if let Some(amount) = self.monthly_amount {
            config.monthly_amount = amount;
        }
        if let Some(start) = self.range_start {
            config.range_start = start;
        }
        if let Some(end) = self.range_end {
            config.range_end = end;
        }
        if let Some(months) = self.min_horizon_months {
            config.min_horizon = MinimumHorizon::Months(months);
        }
        if let Some(attempts) = self.max_attempts {
            config.max_attempts = attempts;
        }

        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider_healthy = state.provider.health_check().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        provider_healthy,
    })
}

/// Default simulation parameters
pub async fn get_config(State(state): State<AppState>) -> Json<SimulationConfig> {
    Json(state.defaults.as_ref().clone())
}

/// Run one simulation
pub async fn simulate_handler(
    State(state): State<AppState>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let seed = payload.seed;
    let include_table = payload.include_table;
    let config = payload.into_config(&state.defaults).map_err(|e| api_error(&e))?;

    tracing::info!(
        instrument = %config.instrument,
        monthly_amount = %config.monthly_amount,
        ?seed,
        "simulation requested"
    );

    let runner = DcaRunner::new(state.provider.clone(), config);
    let result = match seed {
        Some(seed) => runner.run_seeded(seed).await,
        None => runner.run().await,
    };

    let report = result.map_err(|e| {
        tracing::warn!(stage = e.stage(), "Simulation failed: {}", e);
        api_error(&e)
    })?;

    let summary = TextReportRenderer { include_table }
        .render(&report)
        .map_err(|e| api_error(&e))?;

    Ok(Json(SimulateResponse {
        artifact: report.artifact_stem(),
        summary,
        chart: report.chart_series(),
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use dca_core::MockPriceProvider;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            provider: Arc::new(MockPriceProvider::demo()),
            defaults: Arc::new(SimulationConfig::default()),
        }
    }

    async fn post_simulate(body: &str) -> (StatusCode, serde_json::Value) {
        let app = crate::build_router(test_state());
        let response = app
            .oneshot(
                Request::post("/api/simulate")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_simulate_defaults() {
        let (status, json) = post_simulate(r#"{"seed": 42}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["report"]["instrument"], "QQQ");
        assert!(json["artifact"].as_str().unwrap().starts_with("QQQ--"));
        assert!(json["artifact"].as_str().unwrap().ends_with("--2025-02-28--USD"));
        assert!(json["summary"].as_str().unwrap().contains("Annualized return"));
    }

    #[tokio::test]
    async fn test_simulate_sanitizes_artifact_name() {
        let (status, json) = post_simulate(r#"{"instrument": "brk.b", "seed": 1}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["artifact"].as_str().unwrap().starts_with("BRK-B--"));
    }

    #[tokio::test]
    async fn test_infeasible_window_is_bad_request() {
        let (status, json) = post_simulate(
            r#"{"range_start": "2010-01-01", "range_end": "2010-01-01", "min_horizon_months": 3}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_RANGE");
        assert_eq!(json["stage"], "date_sampler");
    }

    #[tokio::test]
    async fn test_inverted_range_is_bad_request() {
        let (status, json) =
            post_simulate(r#"{"range_start": "2020-01-01", "range_end": "2019-01-01"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_RANGE");
        assert_eq!(json["stage"], "date_sampler");
    }

    #[tokio::test]
    async fn test_unknown_instrument_exhausts_retries() {
        let (status, json) = post_simulate(r#"{"instrument": "NOPE", "max_attempts": 3}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "EXHAUSTED_RETRIES");
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let (status, json) = post_simulate(r#"{"monthly_amount": -100}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "CONFIG_ERROR");
    }

    #[test]
    fn test_monthly_amount_keeps_exact_digits() {
        let request: SimulateRequest =
            serde_json::from_str(r#"{"monthly_amount": "333.33333333333333333333"}"#).unwrap();
        let config = request.into_config(&SimulationConfig::default()).unwrap();
        assert_eq!(config.monthly_amount.to_string(), "333.33333333333333333333");
    }

    #[tokio::test]
    async fn test_overflowing_amount_is_unprocessable() {
        let (status, json) =
            post_simulate(r#"{"monthly_amount": "50000000000000000000000000000", "seed": 7}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "ARITHMETIC_OVERFLOW");
    }

    #[test]
    fn test_request_overrides() {
        let request = SimulateRequest {
            instrument: Some(" spy ".into()),
            monthly_amount: Some(Decimal::from(250)),
            min_horizon_months: Some(6),
            ..SimulateRequest::default()
        };
        let config = request.into_config(&SimulationConfig::default()).unwrap();
        assert_eq!(config.instrument, "SPY");
        assert_eq!(config.monthly_amount, Decimal::from(250));
        assert_eq!(config.min_horizon, MinimumHorizon::Months(6));
    }
}
