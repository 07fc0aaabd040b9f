/// Read-only derivations over a clipped series: peak-day selection,
/// monthly energy totals, and the DC/AC ratio sweep behind the
/// clipping heat-map. At hourly cadence a sum of kW equals kWh, which
/// every function here relies on.
use chrono::{Datelike, NaiveDate};

use crate::models::series::{ACPowerSample, MonthlySummaryRow, PVPowerSample, SweepCell};
use crate::services::inverter;

pub struct PeakDay {
    pub date: NaiveDate,
    pub hours: Vec<ACPowerSample>,
    pub e_dc_kwh: f64,
    pub e_ac_kwh: f64,
    pub clip_kwh: f64,
}

/// The UTC calendar day with the highest summed DC power, with its full
/// hourly trace. Stable argmax: on a tie the first day in chronological
/// order wins. `None` only for an empty input.
pub fn peak_day(samples: &[ACPowerSample]) -> Option<PeakDay> {
    let mut best: Option<(NaiveDate, f64)> = None;
    let mut current: Option<(NaiveDate, f64)> = None;

    // The series is time-ordered, so days form contiguous runs.
    for s in samples {
        let day = s.timestamp.date_naive();
        match &mut current {
            Some((d, sum)) if *d == day => *sum += s.dc_power_kw,
            _ => {
                if let Some((d, sum)) = current.take() {
                    if best.as_ref().is_none_or(|(_, b)| sum > *b) {
                        best = Some((d, sum));
                    }
                }
                current = Some((day, s.dc_power_kw));
            }
        }
    }
    if let Some((d, sum)) = current {
        if best.as_ref().is_none_or(|(_, b)| sum > *b) {
            best = Some((d, sum));
        }
    }

    let (date, e_dc_kwh) = best?;
    let hours: Vec<ACPowerSample> = samples
        .iter()
        .filter(|s| s.timestamp.date_naive() == date)
        .cloned()
        .collect();
    let e_ac_kwh = hours.iter().map(|s| s.ac_power_kw).sum();
    let clip_kwh = hours.iter().map(|s| s.clipped_power_kw).sum();
    Some(PeakDay {
        date,
        hours,
        e_dc_kwh,
        e_ac_kwh,
        clip_kwh,
    })
}

/// DC/AC/clipped energy per calendar month. Always emits all 12 rows,
/// zero-filled for months without samples, so downstream relations
/// never have gaps.
pub fn monthly_summary(samples: &[ACPowerSample]) -> Vec<MonthlySummaryRow> {
    let mut dc = [0.0f64; 12];
    let mut ac = [0.0f64; 12];
    let mut clipped = [0.0f64; 12];
    for s in samples {
        let m = s.timestamp.month0() as usize;
        dc[m] += s.dc_power_kw;
        ac[m] += s.ac_power_kw;
        clipped[m] += s.clipped_power_kw;
    }
    (0..12)
        .map(|m| MonthlySummaryRow {
            month: m as u32 + 1,
            e_dc_kwh: dc[m],
            e_ac_kwh: ac[m],
            clip_kwh: clipped[m],
        })
        .collect()
}

/// Ratio grid for the sweep, rounded to two decimals so 1.05-style
/// steps accumulate no floating-point drift across the range. Steps
/// finer than the rounding quantum collapse onto the same grid point;
/// the dedup keeps the grid strictly increasing either way.
pub fn sweep_ratios(min: f64, max: f64, step: f64) -> Vec<f64> {
    let mut ratios = Vec::new();
    let mut r = min;
    while r <= max + 1e-9 {
        ratios.push((r * 100.0).round() / 100.0);
        r += step;
    }
    ratios.dedup();
    ratios
}

/// Re-runs the inverter transform per ratio, holding kWp and η fixed,
/// and reports monthly clipped energy. Exactly `12 × ratios.len()`
/// cells, one per (month, ratio) pair.
pub fn ratio_sweep(
    dc: &[PVPowerSample],
    dc_capacity_kwp: f64,
    inverter_efficiency: f64,
    ratios: &[f64],
) -> Vec<SweepCell> {
    let mut cells = Vec::with_capacity(12 * ratios.len());
    for &ratio in ratios {
        let clipped = inverter::clip(dc, dc_capacity_kwp, ratio, inverter_efficiency);
        for row in monthly_summary(&clipped.samples) {
            cells.push(SweepCell {
                month: row.month,
                dc_ac_ratio: ratio,
                clipped_energy_kwh: row.clip_kwh,
            });
        }
    }
    cells
}

/// Monthly summary as CSV: header row, one row per month, values to one
/// decimal place.
pub fn summary_to_csv(rows: &[MonthlySummaryRow]) -> String {
    let mut csv = String::from("month,E_DC_kWh,E_AC_kWh,Clip_kWh\n");
    for r in rows {
        csv.push_str(&format!(
            "{},{:.1},{:.1},{:.1}\n",
            r.month, r.e_dc_kwh, r.e_ac_kwh, r.clip_kwh
        ));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn sample(ts: DateTime<Utc>, dc: f64, ac: f64, clip: f64) -> ACPowerSample {
        ACPowerSample {
            timestamp: ts,
            poa_w_m2: 0.0,
            ambient_temp_c: 20.0,
            cell_temp_c: 20.0,
            dc_power_kw: dc,
            ac_power_kw: ac,
            clipped_power_kw: clip,
        }
    }

    /// One sample per hour over a full non-leap year, with a constant
    /// power triple.
    fn full_year(dc: f64, ac: f64, clip: f64) -> Vec<ACPowerSample> {
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        (0..8760)
            .map(|h| sample(t0 + Duration::hours(h), dc, ac, clip))
            .collect()
    }

    #[test]
    fn peak_day_picks_the_highest_dc_day_with_its_hours() {
        let t0 = Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap();
        let mut samples = Vec::new();
        for day in 0..3 {
            for hour in 0..24 {
                let dc = if day == 1 { 5.0 } else { 2.0 };
                samples.push(sample(t0 + Duration::hours(day * 24 + hour), dc, dc, 0.0));
            }
        }
        let peak = peak_day(&samples).unwrap();
        assert_eq!(peak.date, NaiveDate::from_ymd_opt(2022, 7, 2).unwrap());
        assert_eq!(peak.hours.len(), 24);
        assert!((peak.e_dc_kwh - 120.0).abs() < 1e-9);
    }

    #[test]
    fn peak_day_tie_break_is_first_day_in_order() {
        let t0 = Utc.with_ymd_and_hms(2022, 7, 1, 12, 0, 0).unwrap();
        let samples = vec![
            sample(t0, 5.0, 5.0, 0.0),
            sample(t0 + Duration::days(1), 5.0, 5.0, 0.0),
        ];
        let peak = peak_day(&samples).unwrap();
        assert_eq!(peak.date, NaiveDate::from_ymd_opt(2022, 7, 1).unwrap());
    }

    #[test]
    fn peak_day_of_empty_series_is_none() {
        assert!(peak_day(&[]).is_none());
    }

    #[test]
    fn monthly_summary_always_has_12_rows() {
        let t0 = Utc.with_ymd_and_hms(2022, 3, 10, 0, 0, 0).unwrap();
        let samples = vec![sample(t0, 1.0, 0.9, 0.1)];
        let rows = monthly_summary(&samples);
        assert_eq!(rows.len(), 12);
        assert!((rows[2].e_dc_kwh - 1.0).abs() < 1e-12);
        assert_eq!(rows[0].e_dc_kwh, 0.0, "empty months are zero, not absent");
    }

    #[test]
    fn zero_irradiance_year_yields_all_zero_sums() {
        let rows = monthly_summary(&full_year(0.0, 0.0, 0.0));
        for r in &rows {
            assert_eq!(r.e_dc_kwh, 0.0);
            assert_eq!(r.e_ac_kwh, 0.0);
            assert_eq!(r.clip_kwh, 0.0);
            assert!(r.e_dc_kwh.is_finite(), "no NaN may leak into the summary");
        }
    }

    #[test]
    fn default_sweep_grid_is_13_ratios() {
        let ratios = sweep_ratios(1.0, 1.6, 0.05);
        assert_eq!(ratios.len(), 13);
        assert_eq!(ratios[0], 1.0);
        assert_eq!(ratios[1], 1.05);
        assert_eq!(*ratios.last().unwrap(), 1.6);
    }

    #[test]
    fn sub_quantum_steps_do_not_duplicate_grid_points() {
        let ratios = sweep_ratios(1.0, 1.6, 0.001);
        assert_eq!(ratios.len(), 61, "one grid point per 0.01 quantum");
        for pair in ratios.windows(2) {
            assert!(pair[0] < pair[1], "grid must be strictly increasing");
        }
    }

    #[test]
    fn sweep_covers_every_month_ratio_pair() {
        let t0 = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let dc: Vec<PVPowerSample> = (0..8760)
            .map(|h| PVPowerSample {
                timestamp: t0 + Duration::hours(h),
                ghi_w_m2: None,
                dni_w_m2: None,
                dif_w_m2: None,
                poa_w_m2: 900.0,
                ambient_temp_c: 25.0,
                cell_temp_c: 50.0,
                dc_power_kw: 9.0,
            })
            .collect();
        let ratios = sweep_ratios(1.0, 1.6, 0.05);
        let cells = ratio_sweep(&dc, 10.0, 0.97, &ratios);
        assert_eq!(cells.len(), 156, "12 months × 13 ratios");
        for &ratio in &ratios {
            for month in 1..=12u32 {
                assert!(
                    cells
                        .iter()
                        .any(|c| c.month == month && c.dc_ac_ratio == ratio),
                    "missing cell ({}, {})",
                    month,
                    ratio
                );
            }
        }
    }

    #[test]
    fn csv_export_has_header_and_one_decimal_values() {
        let rows = vec![
            MonthlySummaryRow { month: 1, e_dc_kwh: 1234.56, e_ac_kwh: 1200.04, clip_kwh: 0.0 },
            MonthlySummaryRow { month: 2, e_dc_kwh: 980.0, e_ac_kwh: 951.23, clip_kwh: 12.34 },
        ];
        let csv = summary_to_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("month,E_DC_kWh,E_AC_kWh,Clip_kWh"));
        assert_eq!(lines.next(), Some("1,1234.6,1200.0,0.0"));
        assert_eq!(lines.next(), Some("2,980.0,951.2,12.3"));
        assert!(lines.next().is_none());
    }
}
