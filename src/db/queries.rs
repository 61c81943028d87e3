use sqlx::PgPool;

use super::models::{Reading, Station};

/// Parameters for inserting a new station row.
pub struct InsertStationParams {
    pub provider_id: i64,
    pub name: String,
    pub country: Option<String>,
    pub latitude: rust_decimal::Decimal,
    pub longitude: rust_decimal::Decimal,
}

/// Parameters for inserting a new reading record.
pub struct InsertReadingParams {
    pub station_id: i64,
    pub temperature_c: rust_decimal::Decimal,
    pub feels_like_c: rust_decimal::Decimal,
    pub humidity_pct: i32,
    pub pressure_hpa: i32,
    pub description: String,
    pub icon: String,
    pub wind_speed_ms: rust_decimal::Decimal,
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

/// List all stations in a fixed, repeatable order (name, then id).
pub async fn list_stations(pool: &PgPool) -> Result<Vec<Station>, sqlx::Error> {
    sqlx::query_as::<_, Station>(
        "SELECT id, provider_id, name, country, latitude, longitude, last_refreshed, created_at
         FROM stations
         ORDER BY name, id",
    )
    .fetch_all(pool)
    .await
}

/// Find a station by its internal storage id.
pub async fn find_station_by_id(pool: &PgPool, id: i64) -> Result<Option<Station>, sqlx::Error> {
    sqlx::query_as::<_, Station>(
        "SELECT id, provider_id, name, country, latitude, longitude, last_refreshed, created_at
         FROM stations WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Find a station by the provider's stable numeric id.
pub async fn find_station_by_provider_id(
    pool: &PgPool,
    provider_id: i64,
) -> Result<Option<Station>, sqlx::Error> {
    sqlx::query_as::<_, Station>(
        "SELECT id, provider_id, name, country, latitude, longitude, last_refreshed, created_at
         FROM stations WHERE provider_id = $1",
    )
    .bind(provider_id)
    .fetch_optional(pool)
    .await
}

/// Find a station whose stored coordinates exactly match the given pair.
pub async fn find_station_by_coordinates(
    pool: &PgPool,
    latitude: rust_decimal::Decimal,
    longitude: rust_decimal::Decimal,
) -> Result<Option<Station>, sqlx::Error> {
    sqlx::query_as::<_, Station>(
        "SELECT id, provider_id, name, country, latitude, longitude, last_refreshed, created_at
         FROM stations
         WHERE latitude = $1 AND longitude = $2",
    )
    .bind(latitude)
    .bind(longitude)
    .fetch_optional(pool)
    .await
}

/// Insert a new station, assigning its storage id.
///
/// Returns `None` when a station with the same provider id already exists
/// (the unique constraint wins over a concurrent insert); callers should
/// reload via [`find_station_by_provider_id`] in that case.
pub async fn insert_station(
    pool: &PgPool,
    params: InsertStationParams,
) -> Result<Option<Station>, sqlx::Error> {
    sqlx::query_as::<_, Station>(
        "INSERT INTO stations (provider_id, name, country, latitude, longitude, last_refreshed, created_at)
         VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
         ON CONFLICT (provider_id) DO NOTHING
         RETURNING id, provider_id, name, country, latitude, longitude, last_refreshed, created_at",
    )
    .bind(params.provider_id)
    .bind(&params.name)
    .bind(&params.country)
    .bind(params.latitude)
    .bind(params.longitude)
    .fetch_optional(pool)
    .await
}

/// Stamp a station's last-refreshed timestamp to now.
pub async fn touch_last_refreshed(pool: &PgPool, station_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE stations SET last_refreshed = NOW() WHERE id = $1")
        .bind(station_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert a new reading record (append-only).
pub async fn insert_reading(
    pool: &PgPool,
    params: InsertReadingParams,
) -> Result<Reading, sqlx::Error> {
    sqlx::query_as::<_, Reading>(
        "INSERT INTO readings (
            station_id, temperature_c, feels_like_c, humidity_pct, pressure_hpa,
            description, icon, wind_speed_ms, captured_at, created_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, NOW()
        )
        RETURNING id, station_id, temperature_c, feels_like_c, humidity_pct, pressure_hpa,
                  description, icon, wind_speed_ms, captured_at, created_at",
    )
    .bind(params.station_id)
    .bind(params.temperature_c)
    .bind(params.feels_like_c)
    .bind(params.humidity_pct)
    .bind(params.pressure_hpa)
    .bind(&params.description)
    .bind(&params.icon)
    .bind(params.wind_speed_ms)
    .bind(params.captured_at)
    .fetch_one(pool)
    .await
}

/// Get the latest reading for a station.
///
/// Newest capture wins; equal timestamps fall back to the highest storage id
/// so the result is deterministic.
pub async fn find_latest_reading(
    pool: &PgPool,
    station_id: i64,
) -> Result<Option<Reading>, sqlx::Error> {
    sqlx::query_as::<_, Reading>(
        "SELECT id, station_id, temperature_c, feels_like_c, humidity_pct, pressure_hpa,
                description, icon, wind_speed_ms, captured_at, created_at
         FROM readings
         WHERE station_id = $1
         ORDER BY captured_at DESC, id DESC
         LIMIT 1",
    )
    .bind(station_id)
    .fetch_optional(pool)
    .await
}
