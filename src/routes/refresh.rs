//! Bulk refresh endpoint.
//!
//! POST /api/v1/stations/refresh — fetch fresh weather for every stored
//! station and report the outcome, including per-station failures.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::resolve::AppState;
use crate::services::resolver::{self, RefreshOutcome};

/// One station the refresh pass could not update.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshFailureItem {
    /// Station storage id
    pub station_id: i64,
    /// Station display name
    pub station_name: String,
    /// Why the provider fetch failed
    pub reason: String,
}

/// Outcome of a bulk refresh pass.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// How many stations the pass covered
    pub attempted: usize,
    /// How many stations gained a new reading
    pub refreshed: usize,
    /// Stations that failed, with reasons; empty when everything succeeded
    pub failures: Vec<RefreshFailureItem>,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            attempted: outcome.attempted,
            refreshed: outcome.refreshed,
            failures: outcome
                .failures
                .into_iter()
                .map(|f| RefreshFailureItem {
                    station_id: f.station_id,
                    station_name: f.station_name,
                    reason: f.reason,
                })
                .collect(),
        }
    }
}

/// Refresh every stored station from the weather provider.
///
/// Stations are processed sequentially in listing order. Per-station
/// provider failures do not abort the pass; they are reported in the
/// response body instead. Comparing `refreshed` to `attempted` tells a
/// caller whether anything — or everything — went wrong.
#[utoipa::path(
    post,
    path = "/api/v1/stations/refresh",
    tag = "Stations",
    responses(
        (status = 200, description = "Refresh outcome with per-station failures", body = RefreshResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn refresh_stations(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let outcome = resolver::refresh_all(&state.pool, &state.owm_client).await?;
    Ok(Json(RefreshResponse::from(outcome)))
}
