use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Fatal errors for a simulation request. No retries happen inside the
/// pipeline: the caller re-fetches or fixes its parameters.
#[derive(Debug, Error)]
pub enum SimError {
    /// The upstream irradiance service could not be reached or answered
    /// with a non-success status.
    #[error("irradiance source unavailable: {0}")]
    SourceUnavailable(String),

    /// The fetched table is structurally unusable (no time field, no
    /// parseable timestamps). Never downgraded to an empty series.
    #[error("malformed irradiance data: {0}")]
    DataFormat(String),

    /// A request parameter is outside its physically valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<reqwest::Error> for SimError {
    fn from(e: reqwest::Error) -> Self {
        SimError::SourceUnavailable(e.to_string())
    }
}

impl IntoResponse for SimError {
    fn into_response(self) -> Response {
        let status = match &self {
            SimError::SourceUnavailable(_) | SimError::DataFormat(_) => StatusCode::BAD_GATEWAY,
            SimError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Non-fatal advisories raised while normalizing a raw series.
/// Computation proceeds; every API response carries the list so the
/// caller knows which fields were approximated or defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartialDataWarning {
    /// Plane-of-array irradiance missing; substituted from GHI (clamped ≥ 0).
    PoaApproximatedFromGhi,
    /// Neither POA nor GHI present; POA filled with 0.0.
    PoaUnavailable,
    /// 2 m air temperature missing; defaulted to 20.0 °C.
    TemperatureDefaulted,
    /// Rows whose timestamp could not be parsed were excluded.
    UnparseableTimestamps { rows: usize },
    /// Duplicate timestamps collapsed to their first occurrence.
    DuplicateTimestamps { rows: usize },
}
