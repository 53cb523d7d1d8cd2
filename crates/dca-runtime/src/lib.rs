//! # dca-runtime
//!
//! Network-backed price providers for the DCA simulator.
//!
//! ## Providers
//!
//! - **Yahoo** (default): daily closes from the Yahoo Finance chart API
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dca_runtime::yahoo::YahooPriceProvider;
//!
//! let provider = Arc::new(YahooPriceProvider::from_env()?);
//! let report = DcaRunner::new(provider, SimulationConfig::from_env()?).run().await?;
//! ```

#[cfg(feature = "yahoo")]
pub mod yahoo;

#[cfg(feature = "yahoo")]
pub use yahoo::{YahooConfig, YahooPriceProvider};

// Re-export core types for convenience
pub use dca_core::{
    DcaRunner, MockPriceProvider, PriceSeries, PriceSeriesProvider, Result, SimulationConfig,
    SimulationError, SimulationReport,
};
