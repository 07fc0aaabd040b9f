/// PV power model
///
/// Linear irradiance scaling with a NOCT-based cell-temperature
/// estimate and a first-order temperature derating around STC (25 °C):
///
///   T_cell = T_amb + (NOCT − 20) / 800 × G_poa
///   P_dc   = kWp × PR × (G_poa / 1000) × (1 + γ × (T_cell − 25))
///
/// The negative clamp models the physical floor: no power flows back
/// from the array. No spectral or low-irradiance corrections.
use crate::config::PlantConfig;
use crate::models::series::{CanonicalSeries, PVPowerSample};

/// Pure transform: the input series is never mutated, so repeated calls
/// with the same inputs yield identical output tables.
pub fn dc_power(series: &CanonicalSeries, plant: &PlantConfig) -> Vec<PVPowerSample> {
    series
        .samples
        .iter()
        .map(|s| {
            let cell_temp_c =
                s.ambient_temp_c + (plant.noct_c - 20.0) / 800.0 * s.poa_w_m2;
            let raw = plant.dc_capacity_kwp
                * plant.performance_ratio
                * (s.poa_w_m2 / 1000.0)
                * (1.0 + plant.temperature_coefficient_gamma * (cell_temp_c - 25.0));
            PVPowerSample {
                timestamp: s.timestamp,
                ghi_w_m2: s.ghi_w_m2,
                dni_w_m2: s.dni_w_m2,
                dif_w_m2: s.dif_w_m2,
                poa_w_m2: s.poa_w_m2,
                ambient_temp_c: s.ambient_temp_c,
                cell_temp_c,
                dc_power_kw: raw.max(0.0),
            }
        })
        .collect()
}
