use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{PlantConfig, SiteConfig};
use crate::error::PartialDataWarning;

// ─── Canonical hourly series ─────────────────────────────────────────────────

/// One normalized hour of irradiance/temperature data.
///
/// GHI/DNI/DIF stay `None` when the source never reported the column, so
/// "not reported" is distinguishable from a measured zero. POA and ambient
/// temperature are always populated (substitution policy in the normalizer).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourlySample {
    pub timestamp: DateTime<Utc>,
    /// Global horizontal irradiance (W/m²)
    pub ghi_w_m2: Option<f64>,
    /// Direct normal (beam) irradiance (W/m²)
    pub dni_w_m2: Option<f64>,
    /// Diffuse horizontal irradiance (W/m²)
    pub dif_w_m2: Option<f64>,
    /// Plane-of-array irradiance (W/m²)
    pub poa_w_m2: f64,
    /// Ambient 2 m air temperature (°C)
    pub ambient_temp_c: f64,
}

/// One calendar year of hourly samples. Invariants upheld by the
/// normalizer: timestamps strictly increasing, no duplicates, all
/// irradiance values ≥ 0.
#[derive(Debug, Clone, Serialize)]
pub struct CanonicalSeries {
    pub samples: Vec<HourlySample>,
}

/// `HourlySample` plus the PV model outputs.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PVPowerSample {
    pub timestamp: DateTime<Utc>,
    pub ghi_w_m2: Option<f64>,
    pub dni_w_m2: Option<f64>,
    pub dif_w_m2: Option<f64>,
    pub poa_w_m2: f64,
    pub ambient_temp_c: f64,
    /// NOCT-estimated cell temperature (°C)
    pub cell_temp_c: f64,
    /// DC power at the array terminals (kW, clamped ≥ 0)
    pub dc_power_kw: f64,
}

/// `PVPowerSample` plus the inverter transform outputs.
/// Invariant: `ac_power_kw + clipped_power_kw == eta × dc_power_kw`
/// within floating-point tolerance, with `0 ≤ ac ≤ P_nom` and `clip ≥ 0`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ACPowerSample {
    pub timestamp: DateTime<Utc>,
    pub poa_w_m2: f64,
    pub ambient_temp_c: f64,
    pub cell_temp_c: f64,
    pub dc_power_kw: f64,
    /// AC power after conversion and clipping (kW)
    pub ac_power_kw: f64,
    /// Power truncated by the inverter ceiling (kW)
    pub clipped_power_kw: f64,
}

// ─── PVGIS wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PvgisResponse {
    pub outputs: PvgisOutputs,
}

#[derive(Debug, Deserialize)]
pub struct PvgisOutputs {
    #[serde(default)]
    pub hourly: Vec<RawHourlyRow>,
}

/// One raw row as PVGIS returns it. Aliases cover the column-name
/// variants seen across radiation databases and API versions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHourlyRow {
    pub time: Option<String>,
    #[serde(rename = "G(i)", alias = "G_TILT")]
    pub poa: Option<f64>,
    #[serde(rename = "G(h)", alias = "G(hor)", alias = "GHI")]
    pub ghi: Option<f64>,
    #[serde(rename = "Gb(n)", alias = "DNI")]
    pub dni: Option<f64>,
    #[serde(rename = "Gd(h)", alias = "DIF")]
    pub dif: Option<f64>,
    #[serde(rename = "T2m")]
    pub t2m: Option<f64>,
}

// ─── REST API response types ─────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct PeakDayResponse {
    /// Calendar day (UTC) with the highest DC energy, as YYYY-MM-DD
    pub date: String,
    pub nominal_inverter_power_kw: f64,
    pub dc_ac_ratio: f64,
    pub e_dc_kwh: f64,
    pub e_ac_kwh: f64,
    pub clip_kwh: f64,
    /// Full hourly trace of the peak day
    pub hours: Vec<ACPowerSample>,
    pub warnings: Vec<PartialDataWarning>,
}

/// One month of energy totals. At hourly cadence a sum of kW equals kWh.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlySummaryRow {
    /// Calendar month, 1–12
    pub month: u32,
    pub e_dc_kwh: f64,
    pub e_ac_kwh: f64,
    pub clip_kwh: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyResponse {
    pub nominal_inverter_power_kw: f64,
    pub months: Vec<MonthlySummaryRow>,
    pub annual_e_dc_kwh: f64,
    pub annual_e_ac_kwh: f64,
    pub annual_clip_kwh: f64,
    pub warnings: Vec<PartialDataWarning>,
}

/// One cell of the DC/AC ratio sweep heat-map relation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SweepCell {
    pub month: u32,
    pub dc_ac_ratio: f64,
    pub clipped_energy_kwh: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SweepResponse {
    pub ratios: Vec<f64>,
    pub cells: Vec<SweepCell>,
    pub warnings: Vec<PartialDataWarning>,
}

/// Configured fallbacks for every query parameter the API accepts.
#[derive(Debug, Serialize, ToSchema)]
pub struct DefaultsResponse {
    pub site: SiteConfig,
    pub plant: PlantConfig,
}
