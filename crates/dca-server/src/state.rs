//! Application State

use std::sync::Arc;

use dca_core::{PriceSeriesProvider, SimulationConfig};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Price data source (Yahoo, mock, etc.)
    pub provider: Arc<dyn PriceSeriesProvider>,

    /// Defaults applied to every simulation request
    pub defaults: Arc<SimulationConfig>,
}
