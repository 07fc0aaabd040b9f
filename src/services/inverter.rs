/// Inverter clipping transform
///
/// DC→AC conversion against a fixed power ceiling:
///
///   P_nom = kWp / dc_ac_ratio
///   P_ac  = min(η × P_dc, P_nom)
///   clip  = max(η × P_dc − P_ac, 0)
///
/// Stateless per sample and read-only over its input, so the ratio
/// sweep can re-run it against the same DC table any number of times.
use crate::models::series::{ACPowerSample, PVPowerSample};

pub struct ClipResult {
    pub samples: Vec<ACPowerSample>,
    pub nominal_inverter_power_kw: f64,
}

pub fn clip(
    dc: &[PVPowerSample],
    dc_capacity_kwp: f64,
    dc_ac_ratio: f64,
    inverter_efficiency: f64,
) -> ClipResult {
    let nominal = dc_capacity_kwp / dc_ac_ratio;
    let samples = dc
        .iter()
        .map(|s| {
            let converted = inverter_efficiency * s.dc_power_kw;
            let ac = converted.min(nominal);
            ACPowerSample {
                timestamp: s.timestamp,
                poa_w_m2: s.poa_w_m2,
                ambient_temp_c: s.ambient_temp_c,
                cell_temp_c: s.cell_temp_c,
                dc_power_kw: s.dc_power_kw,
                ac_power_kw: ac,
                clipped_power_kw: (converted - ac).max(0.0),
            }
        })
        .collect();
    ClipResult {
        samples,
        nominal_inverter_power_kw: nominal,
    }
}
