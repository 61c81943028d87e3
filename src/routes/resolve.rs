//! Coordinate resolution endpoint.
//!
//! - GET /api/v1/stations/resolve?latitude=46.99&longitude=6.93

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::stations::StationResponse;
use crate::services::owm::OwmClient;
use crate::services::resolver;

/// Shared application state for endpoints that reach the weather provider.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: sqlx::PgPool,
    pub(crate) owm_client: OwmClient,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResolveQuery {
    /// Latitude in decimal degrees, -90 to 90
    pub latitude: f64,
    /// Longitude in decimal degrees, -180 to 180
    pub longitude: f64,
}

/// Resolve a coordinate pair to a station with its latest reading.
///
/// Serves from storage when the exact coordinates are already known;
/// otherwise queries the weather provider, persists the new station and
/// its first reading, and returns the composed result.
#[utoipa::path(
    get,
    path = "/api/v1/stations/resolve",
    tag = "Stations",
    params(ResolveQuery),
    responses(
        (status = 200, description = "Resolved station with its latest reading", body = StationResponse),
        (status = 400, description = "Coordinates out of range", body = ErrorResponse),
        (status = 404, description = "No station data for these coordinates", body = ErrorResponse),
        (status = 502, description = "Weather provider failure", body = ErrorResponse),
        (status = 503, description = "Weather provider rate limit reached", body = ErrorResponse),
    )
)]
pub async fn resolve_station(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<StationResponse>, AppError> {
    // Check is_finite() first because NaN passes range comparisons
    // (NaN < -90.0 is false, NaN > 90.0 is also false).
    if !params.latitude.is_finite() || !params.longitude.is_finite() {
        return Err(AppError::InvalidInput(
            "latitude and longitude must be finite numbers".to_string(),
        ));
    }

    let (station, reading) = resolver::resolve_by_coordinates(
        &state.pool,
        &state.owm_client,
        params.latitude,
        params.longitude,
    )
    .await?;

    Ok(Json(StationResponse::from_parts(station, reading)))
}
