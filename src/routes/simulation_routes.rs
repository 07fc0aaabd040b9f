use axum::{Router, routing::get};

use crate::controllers::simulation_controller::{
    get_defaults, get_monthly, get_monthly_csv, get_peak_day, get_sweep,
};
use crate::shared_state::SharedState;

/// Build the `/api/*` sub-router.
/// Handlers extract `State<SharedState>` and/or `State<Config>` via
/// `FromRef<SharedState>` — a single `.with_state(shared)` covers both.
pub fn api_routes(shared: SharedState) -> Router {
    Router::new()
        .route("/simulation/peak-day", get(get_peak_day))
        .route("/simulation/monthly", get(get_monthly))
        .route("/simulation/monthly.csv", get(get_monthly_csv))
        .route("/simulation/sweep", get(get_sweep))
        .route("/config/defaults", get(get_defaults))
        .with_state(shared)
}
