//! Station resolution service.
//!
//! Orchestrates the cache-aside lookup behind the resolve endpoint
//! (storage first, provider fetch on miss, write-back), the pure-read
//! station load, and the bulk refresh with per-station failure isolation.

use sqlx::PgPool;

use crate::db::models::{Reading, Station};
use crate::db::queries::{self, InsertReadingParams, InsertStationParams};
use crate::errors::AppError;
use crate::helpers::{dec_to_f64, f64_to_decimal_1dp, f64_to_decimal_full};
use crate::services::owm::{self, FetchedReading, OwmClient};

/// Whether a provider-reported station name can identify a place.
fn has_usable_name(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Convert a fetched observation into reading insert parameters.
///
/// Weather values are stored at 1 decimal place; humidity and pressure are
/// integers as reported.
fn reading_params(station_id: i64, fetched: &FetchedReading) -> InsertReadingParams {
    InsertReadingParams {
        station_id,
        temperature_c: f64_to_decimal_1dp(fetched.temperature_c),
        feels_like_c: f64_to_decimal_1dp(fetched.feels_like_c),
        humidity_pct: fetched.humidity_pct,
        pressure_hpa: fetched.pressure_hpa,
        description: fetched.description.clone(),
        icon: fetched.icon.clone(),
        wind_speed_ms: f64_to_decimal_1dp(fetched.wind_speed_ms),
        captured_at: fetched.captured_at,
    }
}

/// Resolve a coordinate pair to a station with its latest reading.
///
/// Storage is consulted first: a station whose stored coordinates exactly
/// match the requested pair is served as-is (its latest reading may be
/// absent). On a miss the provider is queried, the new station and its
/// first reading are persisted, and the composed pair is returned.
///
/// A concurrent resolve for the same place can win the station insert;
/// the losing insert reloads the existing row by provider id instead of
/// creating a duplicate.
pub async fn resolve_by_coordinates(
    pool: &PgPool,
    owm: &OwmClient,
    latitude: f64,
    longitude: f64,
) -> Result<(Station, Option<Reading>), AppError> {
    // Reject bad input before any storage or network I/O.
    owm::validate_coordinates(latitude, longitude)?;

    let lat = f64_to_decimal_full(latitude);
    let lon = f64_to_decimal_full(longitude);

    if let Some(station) = queries::find_station_by_coordinates(pool, lat, lon).await? {
        tracing::debug!(
            "Station {} ({}) served from storage",
            station.id,
            station.name
        );
        let reading = queries::find_latest_reading(pool, station.id).await?;
        return Ok((station, reading));
    }

    tracing::debug!(
        "No stored station at ({}, {}), querying provider",
        latitude,
        longitude
    );
    let fetched = owm.fetch(latitude, longitude).await?;

    if !has_usable_name(&fetched.station.name) {
        return Err(AppError::NoStation(
            "No weather station found for these coordinates. \
             Check that they point at a populated location."
                .to_string(),
        ));
    }

    let inserted = queries::insert_station(
        pool,
        InsertStationParams {
            provider_id: fetched.station.provider_id,
            name: fetched.station.name.clone(),
            country: fetched.station.country.clone(),
            latitude: f64_to_decimal_full(fetched.station.latitude),
            longitude: f64_to_decimal_full(fetched.station.longitude),
        },
    )
    .await?;

    let station = match inserted {
        Some(station) => {
            tracing::info!(
                "Created station {} ({}) for provider id {}",
                station.id,
                station.name,
                station.provider_id
            );
            station
        }
        None => {
            // Unique constraint on provider id won over a concurrent insert.
            queries::find_station_by_provider_id(pool, fetched.station.provider_id)
                .await?
                .ok_or(AppError::Database(sqlx::Error::RowNotFound))?
        }
    };

    let reading = queries::insert_reading(pool, reading_params(station.id, &fetched.reading)).await?;

    Ok((station, Some(reading)))
}

/// Load a station by storage id, with its latest reading attached.
///
/// A pure read: no provider call is ever made here. A station with zero
/// readings is returned with `None`, not an error.
pub async fn get_station_with_reading(
    pool: &PgPool,
    station_id: i64,
) -> Result<(Station, Option<Reading>), AppError> {
    let station = queries::find_station_by_id(pool, station_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Station {} not found", station_id)))?;

    let reading = queries::find_latest_reading(pool, station_id).await?;
    Ok((station, reading))
}

/// One station that could not be refreshed, and why.
#[derive(Debug, Clone)]
pub struct RefreshFailure {
    pub station_id: i64,
    pub station_name: String,
    pub reason: String,
}

/// Outcome of a bulk refresh pass.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// How many stations the pass covered.
    pub attempted: usize,
    /// How many gained a new reading and an updated refresh timestamp.
    pub refreshed: usize,
    pub failures: Vec<RefreshFailure>,
}

/// Refresh every stored station from the provider, in listing order.
///
/// Each station is fetched by its *stored* coordinates; a successful fetch
/// appends a new reading and stamps the station's last-refreshed time.
/// Provider failures are isolated per station: they are logged, recorded
/// in the outcome, and the pass continues. Storage failures abort the
/// whole pass, since every remaining step depends on consistent state.
pub async fn refresh_all(pool: &PgPool, owm: &OwmClient) -> Result<RefreshOutcome, AppError> {
    let stations = queries::list_stations(pool).await?;
    tracing::info!("Refreshing {} station(s)", stations.len());

    let mut refreshed = 0;
    let mut failures = Vec::new();

    for station in &stations {
        let latitude = dec_to_f64(station.latitude);
        let longitude = dec_to_f64(station.longitude);

        match owm.fetch(latitude, longitude).await {
            Ok(fetched) => {
                queries::insert_reading(pool, reading_params(station.id, &fetched.reading))
                    .await?;
                queries::touch_last_refreshed(pool, station.id).await?;
                refreshed += 1;
                tracing::debug!("Refreshed station {} ({})", station.id, station.name);
            }
            Err(e) => {
                tracing::warn!(
                    "Refresh failed for station {} ({}): {}",
                    station.id,
                    station.name,
                    e
                );
                failures.push(RefreshFailure {
                    station_id: station.id,
                    station_name: station.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        "Refresh complete: {}/{} station(s) updated",
        refreshed,
        stations.len()
    );

    Ok(RefreshOutcome {
        attempted: stations.len(),
        refreshed,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_has_usable_name() {
        assert!(has_usable_name("Neuchatel"));
        assert!(!has_usable_name(""));
        assert!(!has_usable_name("   "));
    }

    #[test]
    fn test_reading_params_rounds_weather_values() {
        let fetched = FetchedReading {
            temperature_c: 18.34,
            feels_like_c: 17.96,
            humidity_pct: 62,
            pressure_hpa: 1017,
            description: "broken clouds".to_string(),
            icon: "04d".to_string(),
            wind_speed_ms: 3.649,
            captured_at: Utc::now(),
        };

        let params = reading_params(7, &fetched);

        assert_eq!(params.station_id, 7);
        assert_eq!(params.temperature_c, Decimal::from_str("18.3").unwrap());
        assert_eq!(params.feels_like_c, Decimal::from_str("18.0").unwrap());
        assert_eq!(params.wind_speed_ms, Decimal::from_str("3.6").unwrap());
        assert_eq!(params.humidity_pct, 62);
        assert_eq!(params.pressure_hpa, 1017);
        assert_eq!(params.captured_at, fetched.captured_at);
    }
}
