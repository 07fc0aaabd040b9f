use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::SimError;

fn default_base_url() -> String {
    "https://re.jrc.ec.europa.eu/api".to_string()
}
fn default_timeout_s() -> u64 {
    60
}
fn default_cache_ttl_s() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub pvgis: PvgisConfig,
    pub site: SiteConfig,
    pub plant: PlantConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PvgisConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    #[serde(default = "default_cache_ttl_s")]
    pub cache_ttl_s: u64,
}

impl Default for PvgisConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_s: default_timeout_s(),
            cache_ttl_s: default_cache_ttl_s(),
        }
    }
}

/// Default series selection — which PVGIS request to run when the
/// caller omits the corresponding query parameters.
#[derive(Debug, Deserialize, Serialize, Clone, ToSchema)]
pub struct SiteConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    /// Panel tilt above horizontal (°)
    pub tilt_deg: f64,
    /// Panel azimuth (°; 0 = south, +east, -west — PVGIS convention)
    pub azimuth_deg: f64,
}

/// Immutable plant/inverter parameters driving the simulation.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, ToSchema)]
pub struct PlantConfig {
    /// Installed DC peak capacity (kWp)
    pub dc_capacity_kwp: f64,
    /// Lumped derating factor vs. ideal irradiance-only output
    pub performance_ratio: f64,
    /// First-order power temperature coefficient (1/°C, negative)
    pub temperature_coefficient_gamma: f64,
    /// Nominal Operating Cell Temperature (°C)
    pub noct_c: f64,
    /// Installed DC capacity over nominal inverter AC capacity
    pub dc_ac_ratio: f64,
    /// DC→AC conversion efficiency η
    pub inverter_efficiency: f64,
}

impl PlantConfig {
    /// Inverter AC power ceiling (kW).
    pub fn nominal_inverter_power(&self) -> f64 {
        self.dc_capacity_kwp / self.dc_ac_ratio
    }

    /// Range checks per the physical model. Called once per request
    /// before any computation runs.
    pub fn validate(&self) -> Result<(), SimError> {
        fn check(ok: bool, msg: &str) -> Result<(), SimError> {
            if ok {
                Ok(())
            } else {
                Err(SimError::InvalidParameter(msg.to_string()))
            }
        }
        check(
            self.dc_capacity_kwp > 0.0 && self.dc_capacity_kwp.is_finite(),
            "dc_capacity_kwp must be > 0",
        )?;
        check(
            self.performance_ratio > 0.0 && self.performance_ratio <= 1.0,
            "performance_ratio must be in (0, 1]",
        )?;
        check(
            (-0.01..=-0.001).contains(&self.temperature_coefficient_gamma),
            "temperature_coefficient_gamma must be in [-0.01, -0.001] 1/°C",
        )?;
        check(
            (35.0..=60.0).contains(&self.noct_c),
            "noct_c must be in [35, 60] °C",
        )?;
        check(
            (1.0..=1.6).contains(&self.dc_ac_ratio),
            "dc_ac_ratio must be in [1.0, 1.6]",
        )?;
        check(
            self.inverter_efficiency > 0.0 && self.inverter_efficiency <= 1.0,
            "inverter_efficiency must be in (0, 1]",
        )
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_plant() -> PlantConfig {
        PlantConfig {
            dc_capacity_kwp: 10.0,
            performance_ratio: 0.85,
            temperature_coefficient_gamma: -0.004,
            noct_c: 45.0,
            dc_ac_ratio: 1.2,
            inverter_efficiency: 0.97,
        }
    }

    #[test]
    fn valid_plant_passes_and_derives_nominal_power() {
        let p = valid_plant();
        assert!(p.validate().is_ok());
        assert!((p.nominal_inverter_power() - 10.0 / 1.2).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut p = valid_plant();
        p.dc_capacity_kwp = 0.0;
        assert!(p.validate().is_err(), "zero capacity must be rejected");

        let mut p = valid_plant();
        p.performance_ratio = 1.2;
        assert!(p.validate().is_err(), "PR > 1 must be rejected");

        let mut p = valid_plant();
        p.temperature_coefficient_gamma = 0.004;
        assert!(p.validate().is_err(), "positive gamma must be rejected");

        let mut p = valid_plant();
        p.dc_ac_ratio = 1.7;
        assert!(p.validate().is_err(), "dc_ac_ratio above 1.6 must be rejected");
    }

    #[test]
    fn config_json_parses_with_pvgis_defaults() {
        let raw = r#"{
            "server": { "port": 8080 },
            "site": { "latitude": 40.4168, "longitude": -3.7038, "year": 2022,
                      "tilt_deg": 25.0, "azimuth_deg": 0.0 },
            "plant": { "dc_capacity_kwp": 10.0, "performance_ratio": 0.85,
                       "temperature_coefficient_gamma": -0.004, "noct_c": 45.0,
                       "dc_ac_ratio": 1.2, "inverter_efficiency": 0.97 }
        }"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.pvgis.timeout_s, 60);
        assert_eq!(cfg.pvgis.cache_ttl_s, 3600);
        assert!(cfg.pvgis.base_url.contains("re.jrc.ec.europa.eu"));
    }
}
