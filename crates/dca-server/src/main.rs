//! dca-server
//!
//! Axum-based server running dollar-cost averaging backtests on request.
//!
//! Set `DCA_RUN_ONCE=1` to run a single simulation with the configured
//! defaults, print the report and exit.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dca_core::{
    DcaRunner, MockPriceProvider, PriceSeriesProvider, ReportRenderer, SimulationConfig,
    TextReportRenderer,
};
use dca_runtime::YahooPriceProvider;

use crate::handlers::{get_config, health_check, simulate_handler};
use crate::state::AppState;

/// Build the HTTP router
fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/config", get(get_config))
        .route("/api/simulate", post(simulate_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn provider_from_env() -> anyhow::Result<Arc<dyn PriceSeriesProvider>> {
    let kind = std::env::var("DCA_PROVIDER").unwrap_or_else(|_| "yahoo".into());
    let provider: Arc<dyn PriceSeriesProvider> = match kind.to_lowercase().as_str() {
        "mock" => Arc::new(MockPriceProvider::demo()),
        "yahoo" => Arc::new(YahooPriceProvider::from_env()?),
        other => anyhow::bail!("unknown DCA_PROVIDER {other:?} (expected 'yahoo' or 'mock')"),
    };
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let defaults = SimulationConfig::from_env()?;
    let provider = provider_from_env()?;

    if provider.health_check().await {
        tracing::info!("✓ Price provider {} reachable", provider.name());
    } else {
        tracing::warn!("⚠ Price provider {} not reachable - simulations will fail", provider.name());
        tracing::warn!("  Set DCA_PROVIDER=mock to use synthetic prices");
    }

    if std::env::var("DCA_RUN_ONCE").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
        let report = DcaRunner::new(provider, defaults).run().await?;
        let text = TextReportRenderer { include_table: true }.render(&report)?;
        println!("{text}");
        tracing::info!("Artifact: {}", report.artifact_stem());
        return Ok(());
    }

    tracing::info!(
        instrument = %defaults.instrument,
        monthly_amount = %defaults.monthly_amount,
        range_start = %defaults.range_start,
        range_end = %defaults.range_end,
        min_horizon = %defaults.min_horizon,
        "Simulation defaults"
    );

    let state = AppState {
        provider,
        defaults: Arc::new(defaults),
    };
    let app = build_router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 dca-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health        - Health check");
    tracing::info!("  GET  /api/config    - Default simulation parameters");
    tracing::info!("  POST /api/simulate  - Run a DCA backtest");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
