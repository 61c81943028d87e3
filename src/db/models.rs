use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// A weather station resolved from the provider.
///
/// `provider_id` is the provider's stable numeric identifier and the
/// deduplication key (unique in the database); `id` is the internal
/// storage id assigned on first insert.
#[derive(Debug, Clone, FromRow)]
pub struct Station {
    pub id: i64,
    pub provider_id: i64,
    pub name: String,
    /// ISO country code; the provider omits it for some locations.
    pub country: Option<String>,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub last_refreshed: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One immutable weather observation for a station.
///
/// Refreshes append new rows; existing rows are never mutated.
#[derive(Debug, Clone, FromRow)]
#[allow(dead_code)] // All fields populated by FromRow; some accessed only via route serialization
pub struct Reading {
    pub id: i64,
    pub station_id: i64,
    pub temperature_c: Decimal,
    pub feels_like_c: Decimal,
    pub humidity_pct: i32,
    pub pressure_hpa: i32,
    pub description: String,
    pub icon: String,
    pub wind_speed_ms: Decimal,
    /// When the provider observed this weather.
    pub captured_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
