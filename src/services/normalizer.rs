/// Series normalizer
///
/// Turns the raw PVGIS hourly table into a canonical series:
///  1. Timestamp parsing — compact `YYYYMMDD:HHMM` when every row
///     matches it, ISO-8601 when any row carries a `T`, best-effort
///     inference otherwise.
///  2. Ordering — ascending by timestamp, duplicates collapse to the
///     first occurrence.
///  3. Substitution — POA from GHI (clamped ≥ 0) when the source omits
///     the tilted-plane column, ambient temperature defaults to 20 °C.
///
/// Substitutions and dropped rows are advisory warnings; a table with
/// no usable time information is a hard `DataFormat` error. The
/// normalizer never emits an empty or zero-filled series in place of a
/// format error.
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{PartialDataWarning, SimError};
use crate::models::series::{CanonicalSeries, HourlySample, RawHourlyRow};

pub struct NormalizeOutcome {
    pub series: CanonicalSeries,
    pub warnings: Vec<PartialDataWarning>,
}

/// PVGIS compact encoding, e.g. `20220101:0010`.
fn is_compact(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 13
        && b[8] == b':'
        && b[..8].iter().all(u8::is_ascii_digit)
        && b[9..].iter().all(u8::is_ascii_digit)
}

fn parse_compact(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y%m%d:%H%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// ISO-8601 with a `T` separator; seconds and zone designator optional
/// (PVGIS emits `2022-01-01T00:10Z`, which RFC 3339 proper rejects).
/// Numeric offsets are honored at both second and minute precision.
fn parse_iso(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    let bare = s.trim_end_matches('Z');
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(bare, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn parse_inferred(s: &str) -> Option<DateTime<Utc>> {
    if is_compact(s) {
        return parse_compact(s);
    }
    if s.contains('T') {
        return parse_iso(s);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

pub fn normalize(rows: Vec<RawHourlyRow>) -> Result<NormalizeOutcome, SimError> {
    if rows.is_empty() {
        return Err(SimError::DataFormat("empty hourly table".into()));
    }
    if rows.iter().all(|r| r.time.is_none()) {
        return Err(SimError::DataFormat("source table has no time field".into()));
    }

    // Encoding detection runs over the whole column, as a column mixes
    // encodings only when something upstream is already broken.
    let all_compact = rows
        .iter()
        .filter_map(|r| r.time.as_deref())
        .all(is_compact);
    let any_iso = rows
        .iter()
        .filter_map(|r| r.time.as_deref())
        .any(|t| t.contains('T'));
    let parse: fn(&str) -> Option<DateTime<Utc>> = if all_compact {
        parse_compact
    } else if any_iso {
        parse_iso
    } else {
        parse_inferred
    };

    // Column-level presence decides the substitution policy, mirroring
    // the source format where a column is either reported for the whole
    // year or not at all.
    let has_poa = rows.iter().any(|r| r.poa.is_some());
    let has_ghi = rows.iter().any(|r| r.ghi.is_some());
    let has_dni = rows.iter().any(|r| r.dni.is_some());
    let has_dif = rows.iter().any(|r| r.dif.is_some());
    let has_t2m = rows.iter().any(|r| r.t2m.is_some());

    let mut warnings = Vec::new();
    let mut unparseable = 0usize;
    let mut samples: Vec<HourlySample> = Vec::with_capacity(rows.len());

    for row in &rows {
        let Some(ts) = row.time.as_deref().and_then(parse) else {
            unparseable += 1;
            #[cfg(feature = "verbose_log")]
            println!("[NORMALIZE] unparseable timestamp: {:?}", row.time);
            continue;
        };

        let ghi = if has_ghi { Some(row.ghi.unwrap_or(0.0).max(0.0)) } else { None };
        let dni = if has_dni { Some(row.dni.unwrap_or(0.0).max(0.0)) } else { None };
        let dif = if has_dif { Some(row.dif.unwrap_or(0.0).max(0.0)) } else { None };

        let poa = if has_poa {
            row.poa.unwrap_or(0.0).max(0.0)
        } else {
            ghi.unwrap_or(0.0)
        };

        samples.push(HourlySample {
            timestamp: ts,
            ghi_w_m2: ghi,
            dni_w_m2: dni,
            dif_w_m2: dif,
            poa_w_m2: poa,
            ambient_temp_c: row.t2m.unwrap_or(20.0),
        });
    }

    if samples.is_empty() {
        return Err(SimError::DataFormat("no parseable timestamps in source table".into()));
    }
    if unparseable > 0 {
        warnings.push(PartialDataWarning::UnparseableTimestamps { rows: unparseable });
    }
    if !has_poa {
        warnings.push(if has_ghi {
            PartialDataWarning::PoaApproximatedFromGhi
        } else {
            PartialDataWarning::PoaUnavailable
        });
    }
    if !has_t2m {
        warnings.push(PartialDataWarning::TemperatureDefaulted);
    }

    // Stable sort, then first-occurrence-wins on duplicate timestamps.
    let before = samples.len();
    samples.sort_by_key(|s| s.timestamp);
    samples.dedup_by_key(|s| s.timestamp);
    let dropped = before - samples.len();
    if dropped > 0 {
        warnings.push(PartialDataWarning::DuplicateTimestamps { rows: dropped });
    }

    Ok(NormalizeOutcome {
        series: CanonicalSeries { samples },
        warnings,
    })
}
