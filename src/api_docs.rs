use utoipa::OpenApi;

use crate::config;
use crate::controllers::simulation_controller;
use crate::error;
use crate::models::series;

#[derive(OpenApi)]
#[openapi(
    paths(
        simulation_controller::get_peak_day,
        simulation_controller::get_monthly,
        simulation_controller::get_monthly_csv,
        simulation_controller::get_sweep,
        simulation_controller::get_defaults
    ),
    components(
        schemas(
            series::HourlySample,
            series::PVPowerSample,
            series::ACPowerSample,
            series::PeakDayResponse,
            series::MonthlySummaryRow,
            series::MonthlyResponse,
            series::SweepCell,
            series::SweepResponse,
            series::DefaultsResponse,
            config::SiteConfig,
            config::PlantConfig,
            error::PartialDataWarning
        )
    ),
    tags(
        (name = "pv-clipping-sim", description = "PV Inverter Clipping Simulation API")
    )
)]
pub struct ApiDoc;
