use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::config::{Config, PlantConfig, SiteConfig};
use crate::error::{PartialDataWarning, SimError};
use crate::models::series::{
    CanonicalSeries, DefaultsResponse, MonthlyResponse, PeakDayResponse, SweepResponse,
};
use crate::services::{aggregator, inverter, normalizer, pv_model, pvgis_service};
use crate::shared_state::{AppState, SeriesKey, SharedState};

/// Query parameters accepted by every simulation endpoint. Anything
/// omitted falls back to the `site`/`plant` sections of config.json.
/// The ratio_* fields only apply to the sweep endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SimQuery {
    /// Latitude in decimal degrees
    pub lat: Option<f64>,
    /// Longitude in decimal degrees
    pub lon: Option<f64>,
    /// Calendar year of the irradiance series
    pub year: Option<i32>,
    /// Panel tilt (°)
    pub tilt: Option<f64>,
    /// Panel azimuth (°; 0 = south, +east, -west)
    pub azimuth: Option<f64>,
    /// Installed DC peak capacity (kWp)
    pub kwp: Option<f64>,
    /// Performance ratio
    pub pr: Option<f64>,
    /// Temperature coefficient γ (1/°C)
    pub gamma: Option<f64>,
    /// NOCT (°C)
    pub noct: Option<f64>,
    /// DC/AC ratio
    pub dc_ac: Option<f64>,
    /// Inverter efficiency η
    pub eta: Option<f64>,
    /// Sweep lower bound (sweep endpoint only)
    pub ratio_min: Option<f64>,
    /// Sweep upper bound (sweep endpoint only)
    pub ratio_max: Option<f64>,
    /// Sweep step (sweep endpoint only)
    pub ratio_step: Option<f64>,
}

/// Merge query overrides with configured defaults and range-check the
/// result before any computation or fetch runs.
fn resolve(config: &Config, q: &SimQuery) -> Result<(SiteConfig, PlantConfig), SimError> {
    let site = SiteConfig {
        latitude: q.lat.unwrap_or(config.site.latitude),
        longitude: q.lon.unwrap_or(config.site.longitude),
        year: q.year.unwrap_or(config.site.year),
        tilt_deg: q.tilt.unwrap_or(config.site.tilt_deg),
        azimuth_deg: q.azimuth.unwrap_or(config.site.azimuth_deg),
    };
    if !(-90.0..=90.0).contains(&site.latitude) {
        return Err(SimError::InvalidParameter("lat must be in [-90, 90]".into()));
    }
    if !(-180.0..=180.0).contains(&site.longitude) {
        return Err(SimError::InvalidParameter("lon must be in [-180, 180]".into()));
    }

    let plant = PlantConfig {
        dc_capacity_kwp: q.kwp.unwrap_or(config.plant.dc_capacity_kwp),
        performance_ratio: q.pr.unwrap_or(config.plant.performance_ratio),
        temperature_coefficient_gamma: q
            .gamma
            .unwrap_or(config.plant.temperature_coefficient_gamma),
        noct_c: q.noct.unwrap_or(config.plant.noct_c),
        dc_ac_ratio: q.dc_ac.unwrap_or(config.plant.dc_ac_ratio),
        inverter_efficiency: q.eta.unwrap_or(config.plant.inverter_efficiency),
    };
    plant.validate()?;
    Ok((site, plant))
}

/// Range-check the sweep bounds and build the ratio grid. The grid is
/// quantized to 0.01, so steps below that would only collapse onto
/// duplicate grid points (and blow up the row count); they are
/// rejected rather than silently merged.
fn resolve_ratio_grid(q: &SimQuery) -> Result<Vec<f64>, SimError> {
    let min = q.ratio_min.unwrap_or(1.0);
    let max = q.ratio_max.unwrap_or(1.6);
    let step = q.ratio_step.unwrap_or(0.05);
    if !(1.0..=1.6).contains(&min) || !(1.0..=1.6).contains(&max) || min > max {
        return Err(SimError::InvalidParameter(
            "ratio_min/ratio_max must satisfy 1.0 <= min <= max <= 1.6".into(),
        ));
    }
    if !(step >= 0.01) {
        return Err(SimError::InvalidParameter(
            "ratio_step must be >= 0.01".into(),
        ));
    }
    Ok(aggregator::sweep_ratios(min, max, step))
}

/// Cache-or-fetch for the canonical series. Normalization warnings are
/// cached alongside the series so repeated requests report them too.
async fn load_series(
    app: &AppState,
    config: &Config,
    site: &SiteConfig,
) -> Result<(Arc<CanonicalSeries>, Vec<PartialDataWarning>), SimError> {
    let key = SeriesKey::new(
        site.latitude,
        site.longitude,
        site.year,
        site.tilt_deg,
        site.azimuth_deg,
    );
    if let Some(hit) = app.get(&key) {
        return Ok(hit);
    }

    let rows = pvgis_service::fetch_hourly_series(
        &config.pvgis,
        site.latitude,
        site.longitude,
        site.year,
        site.tilt_deg,
        site.azimuth_deg,
    )
    .await?;
    let outcome = normalizer::normalize(rows)?;
    println!(
        "[SERIES] ({:.4}, {:.4}) year {}: {} hourly samples, {} warnings",
        site.latitude,
        site.longitude,
        site.year,
        outcome.series.samples.len(),
        outcome.warnings.len()
    );

    let series = Arc::new(outcome.series);
    app.insert(key, Arc::clone(&series), outcome.warnings.clone());
    Ok((series, outcome.warnings))
}

/// GET /api/simulation/peak-day
/// Hourly DC/AC/clipping curves for the best-producing day
///
/// Selects the UTC calendar day with the highest summed DC energy and
/// returns its full hourly trace plus day totals.
#[utoipa::path(
    get,
    path = "/api/simulation/peak-day",
    params(SimQuery),
    responses(
        (status = 200, description = "Peak day curves and totals", body = PeakDayResponse),
        (status = 400, description = "Parameter outside its valid range"),
        (status = 502, description = "Irradiance source unavailable or malformed")
    )
)]
pub async fn get_peak_day(
    State(shared): State<SharedState>,
    Query(q): Query<SimQuery>,
) -> Result<impl IntoResponse, SimError> {
    let (site, plant) = resolve(&shared.config, &q)?;
    let (series, warnings) = load_series(&shared.app, &shared.config, &site).await?;

    let dc = pv_model::dc_power(&series, &plant);
    let clipped = inverter::clip(
        &dc,
        plant.dc_capacity_kwp,
        plant.dc_ac_ratio,
        plant.inverter_efficiency,
    );
    let peak = aggregator::peak_day(&clipped.samples)
        .ok_or_else(|| SimError::DataFormat("series has no samples".into()))?;

    Ok(Json(PeakDayResponse {
        date: peak.date.to_string(),
        nominal_inverter_power_kw: clipped.nominal_inverter_power_kw,
        dc_ac_ratio: plant.dc_ac_ratio,
        e_dc_kwh: peak.e_dc_kwh,
        e_ac_kwh: peak.e_ac_kwh,
        clip_kwh: peak.clip_kwh,
        hours: peak.hours,
        warnings,
    }))
}

/// GET /api/simulation/monthly
/// Monthly DC/AC/clipped energy summary
///
/// Twelve rows, one per calendar month, plus annual totals. Months with
/// no samples report zeros.
#[utoipa::path(
    get,
    path = "/api/simulation/monthly",
    params(SimQuery),
    responses(
        (status = 200, description = "Monthly energy summary", body = MonthlyResponse),
        (status = 400, description = "Parameter outside its valid range"),
        (status = 502, description = "Irradiance source unavailable or malformed")
    )
)]
pub async fn get_monthly(
    State(shared): State<SharedState>,
    Query(q): Query<SimQuery>,
) -> Result<impl IntoResponse, SimError> {
    let (site, plant) = resolve(&shared.config, &q)?;
    let (series, warnings) = load_series(&shared.app, &shared.config, &site).await?;

    let dc = pv_model::dc_power(&series, &plant);
    let clipped = inverter::clip(
        &dc,
        plant.dc_capacity_kwp,
        plant.dc_ac_ratio,
        plant.inverter_efficiency,
    );
    let months = aggregator::monthly_summary(&clipped.samples);

    Ok(Json(MonthlyResponse {
        nominal_inverter_power_kw: clipped.nominal_inverter_power_kw,
        annual_e_dc_kwh: months.iter().map(|m| m.e_dc_kwh).sum(),
        annual_e_ac_kwh: months.iter().map(|m| m.e_ac_kwh).sum(),
        annual_clip_kwh: months.iter().map(|m| m.clip_kwh).sum(),
        months,
        warnings,
    }))
}

/// GET /api/simulation/monthly.csv
/// Monthly summary as CSV download
///
/// Same table as /api/simulation/monthly, serialized as
/// comma-separated text with a header row and one decimal place.
#[utoipa::path(
    get,
    path = "/api/simulation/monthly.csv",
    params(SimQuery),
    responses(
        (status = 200, description = "CSV monthly summary", content_type = "text/csv"),
        (status = 400, description = "Parameter outside its valid range"),
        (status = 502, description = "Irradiance source unavailable or malformed")
    )
)]
pub async fn get_monthly_csv(
    State(shared): State<SharedState>,
    Query(q): Query<SimQuery>,
) -> Result<impl IntoResponse, SimError> {
    let (site, plant) = resolve(&shared.config, &q)?;
    let (series, _warnings) = load_series(&shared.app, &shared.config, &site).await?;

    let dc = pv_model::dc_power(&series, &plant);
    let clipped = inverter::clip(
        &dc,
        plant.dc_capacity_kwp,
        plant.dc_ac_ratio,
        plant.inverter_efficiency,
    );
    let csv = aggregator::summary_to_csv(&aggregator::monthly_summary(&clipped.samples));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"monthly_clipping_summary.csv\"",
            ),
        ],
        csv,
    ))
}

/// GET /api/simulation/sweep
/// Clipped energy per month across a DC/AC ratio grid
///
/// Re-runs the inverter transform per ratio holding kWp and η fixed.
/// The result is a flat relation with exactly one cell per
/// (month, ratio) pair, suitable for a 2D heat-map.
#[utoipa::path(
    get,
    path = "/api/simulation/sweep",
    params(SimQuery),
    responses(
        (status = 200, description = "Ratio sweep relation", body = SweepResponse),
        (status = 400, description = "Parameter outside its valid range"),
        (status = 502, description = "Irradiance source unavailable or malformed")
    )
)]
pub async fn get_sweep(
    State(shared): State<SharedState>,
    Query(q): Query<SimQuery>,
) -> Result<impl IntoResponse, SimError> {
    let (site, plant) = resolve(&shared.config, &q)?;

    let ratios = resolve_ratio_grid(&q)?;

    let (series, warnings) = load_series(&shared.app, &shared.config, &site).await?;
    let dc = pv_model::dc_power(&series, &plant);
    let cells = aggregator::ratio_sweep(
        &dc,
        plant.dc_capacity_kwp,
        plant.inverter_efficiency,
        &ratios,
    );

    Ok(Json(SweepResponse {
        ratios,
        cells,
        warnings,
    }))
}

/// GET /api/config/defaults
/// Configured site and plant defaults
///
/// The fallback values applied when simulation query parameters are
/// omitted.
#[utoipa::path(
    get,
    path = "/api/config/defaults",
    responses(
        (status = 200, description = "Configured defaults", body = DefaultsResponse)
    )
)]
pub async fn get_defaults(State(config): State<Config>) -> impl IntoResponse {
    Json(DefaultsResponse {
        site: config.site,
        plant: config.plant,
    })
}
