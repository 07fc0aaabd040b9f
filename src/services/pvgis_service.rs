/// PVGIS `seriescalc` client
///
/// Fetches one calendar year of hourly irradiance/temperature data for
/// a (lat, lon, tilt, azimuth) request. The endpoint is treated as a
/// black box returning a table keyed by timestamp; normalization
/// happens downstream. Transport and HTTP failures surface as
/// `SourceUnavailable` with no retry here — callers decide whether to
/// re-request.
use std::time::Duration;

use crate::config::PvgisConfig;
use crate::error::SimError;
use crate::models::series::{PvgisResponse, RawHourlyRow};

pub async fn fetch_hourly_series(
    cfg: &PvgisConfig,
    lat: f64,
    lon: f64,
    year: i32,
    tilt_deg: f64,
    azimuth_deg: f64,
) -> Result<Vec<RawHourlyRow>, SimError> {
    let url = format!(
        "{}/seriescalc?lat={:.5}&lon={:.5}&startyear={}&endyear={}\
         &radDatabase=PVGIS-SARAH&outputformat=json\
         &angle={:.1}&aspect={:.1}&pvcalculation=0",
        cfg.base_url.trim_end_matches('/'),
        lat,
        lon,
        year,
        year,
        tilt_deg,
        azimuth_deg
    );

    #[cfg(feature = "verbose_log")]
    println!("[PVGIS] GET {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.timeout_s))
        .build()?;
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(SimError::SourceUnavailable(format!(
            "PVGIS answered HTTP {}",
            response.status()
        )));
    }
    let decoded = response
        .json::<PvgisResponse>()
        .await
        .map_err(|e| SimError::DataFormat(format!("PVGIS response not decodable: {}", e)))?;
    Ok(decoded.outputs.hourly)
}
