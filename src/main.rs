// Weather Station API v0.1
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::resolve::AppState;
use services::owm::OwmClient;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// Weather Station API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Station API",
        version = "0.1.0",
        description = "Resolves geographic coordinates to named weather stations with their \
            latest readings. Stations and readings are persisted, so repeated lookups for \
            known coordinates are served from storage instead of calling OpenWeatherMap \
            again; a bulk refresh appends fresh readings for every stored station.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Stations", description = "Station resolution, lookup, and refresh"),
    ),
    paths(
        routes::health::health_check,
        routes::stations::list_stations,
        routes::stations::get_station,
        routes::resolve::resolve_station,
        routes::refresh::refresh_stations,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::stations::StationListItem,
            routes::stations::ReadingResponse,
            routes::stations::StationResponse,
            routes::refresh::RefreshResponse,
            routes::refresh::RefreshFailureItem,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_station_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Create the weather provider client
    let owm_client = OwmClient::new(&config.owm_api_key);

    // Build shared application state for provider-reaching routes
    let app_state = AppState {
        pool: pool.clone(),
        owm_client,
    };

    // CORS — resolution and refresh mutate storage, so allow GET and POST
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    // Build router
    // Pure-read station routes use PgPool state directly; resolution and
    // refresh need the provider client and use AppState.
    let station_routes = Router::new()
        .route("/api/v1/stations", get(routes::stations::list_stations))
        .route("/api/v1/stations/:id", get(routes::stations::get_station))
        .with_state(pool.clone());

    let resolution_routes = Router::new()
        .route(
            "/api/v1/stations/resolve",
            get(routes::resolve::resolve_station),
        )
        .route(
            "/api/v1/stations/refresh",
            post(routes::refresh::refresh_stations),
        )
        .with_state(app_state);

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(station_routes)
        .merge(resolution_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
