//! Station read endpoints.
//!
//! - GET /api/v1/stations
//! - GET /api/v1/stations/:id

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::db::{models, queries};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::dec_to_f64;
use crate::services::resolver;

/// Response type for GET /api/v1/stations (list, without readings).
#[derive(Debug, Serialize, ToSchema)]
pub struct StationListItem {
    /// Internal storage identifier
    pub id: i64,
    /// The provider's stable numeric identifier
    pub provider_id: i64,
    /// Station display name (e.g. "Neuchatel")
    pub name: String,
    /// ISO country code, when the provider reports one
    pub country: Option<String>,
    /// Latitude (WGS84)
    pub latitude: f64,
    /// Longitude (WGS84)
    pub longitude: f64,
    /// Last successful refresh in ISO 8601 / RFC 3339 format
    pub last_refreshed: String,
}

impl From<models::Station> for StationListItem {
    fn from(s: models::Station) -> Self {
        Self {
            id: s.id,
            provider_id: s.provider_id,
            name: s.name,
            country: s.country,
            latitude: dec_to_f64(s.latitude),
            longitude: dec_to_f64(s.longitude),
            last_refreshed: s.last_refreshed.to_rfc3339(),
        }
    }
}

/// Weather observation attached to a station response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadingResponse {
    /// Air temperature in Celsius
    pub temperature_c: f64,
    /// Feels-like temperature in Celsius
    pub feels_like_c: f64,
    /// Relative humidity percentage
    pub humidity_pct: i32,
    /// Atmospheric pressure in hPa
    pub pressure_hpa: i32,
    /// Textual weather description (e.g. "broken clouds")
    pub description: String,
    /// Provider icon code (e.g. "04d")
    pub icon: String,
    /// Wind speed in metres per second
    pub wind_speed_ms: f64,
    /// When the weather was observed (ISO 8601)
    pub captured_at: String,
}

impl From<models::Reading> for ReadingResponse {
    fn from(r: models::Reading) -> Self {
        Self {
            temperature_c: dec_to_f64(r.temperature_c),
            feels_like_c: dec_to_f64(r.feels_like_c),
            humidity_pct: r.humidity_pct,
            pressure_hpa: r.pressure_hpa,
            description: r.description,
            icon: r.icon,
            wind_speed_ms: dec_to_f64(r.wind_speed_ms),
            captured_at: r.captured_at.to_rfc3339(),
        }
    }
}

/// A station composed with its latest reading.
#[derive(Debug, Serialize, ToSchema)]
pub struct StationResponse {
    /// Internal storage identifier
    pub id: i64,
    /// The provider's stable numeric identifier
    pub provider_id: i64,
    /// Station display name
    pub name: String,
    /// ISO country code, when the provider reports one
    pub country: Option<String>,
    /// Latitude (WGS84)
    pub latitude: f64,
    /// Longitude (WGS84)
    pub longitude: f64,
    /// Last successful refresh in ISO 8601 / RFC 3339 format
    pub last_refreshed: String,
    /// Latest reading; null for a station with no stored readings
    pub reading: Option<ReadingResponse>,
}

impl StationResponse {
    pub fn from_parts(station: models::Station, reading: Option<models::Reading>) -> Self {
        Self {
            id: station.id,
            provider_id: station.provider_id,
            name: station.name,
            country: station.country,
            latitude: dec_to_f64(station.latitude),
            longitude: dec_to_f64(station.longitude),
            last_refreshed: station.last_refreshed.to_rfc3339(),
            reading: reading.map(ReadingResponse::from),
        }
    }
}

/// List all known stations, ordered by name.
///
/// Readings are not attached here; use the station detail endpoint
/// per station when the latest weather is needed.
#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    responses(
        (status = 200, description = "List of all stations", body = Vec<StationListItem>),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn list_stations(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<StationListItem>>, AppError> {
    let stations = queries::list_stations(&pool).await?;
    let items: Vec<StationListItem> = stations.into_iter().map(StationListItem::from).collect();
    Ok(Json(items))
}

/// Get a station by storage id, with its latest reading.
#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(
        ("id" = i64, Path, description = "Station storage id"),
    ),
    responses(
        (status = 200, description = "Station with its latest reading", body = StationResponse),
        (status = 404, description = "Station not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn get_station(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Json<StationResponse>, AppError> {
    let (station, reading) = resolver::get_station_with_reading(&pool, id).await?;
    Ok(Json(StationResponse::from_parts(station, reading)))
}
