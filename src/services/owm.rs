//! OpenWeatherMap current-weather client.
//!
//! Fetches the current observation for a coordinate pair and maps it into
//! provider-independent station and reading values.
//! See: https://openweathermap.org/current

use chrono::{DateTime, Utc};
use serde::Deserialize;

const OWM_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// A single fetch outcome that is not a usable observation.
///
/// Each cause carries its own variant so callers can distinguish
/// user-correctable conditions (bad coordinates, no data for a location)
/// from credential, quota, and transport problems. A fetch is a single
/// attempt; retry policy, if any, belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0}")]
    InvalidCoordinate(String),

    #[error("weather provider rejected the API credential")]
    Auth,

    #[error("no weather data for these coordinates")]
    NotFound,

    #[error("weather provider rate limit reached, try again later")]
    RateLimited,

    #[error("weather provider returned HTTP {0}")]
    Status(u16),

    #[error("weather provider request failed: {0}")]
    Transport(String),

    #[error("malformed weather provider response: {0}")]
    MalformedResponse(String),
}

/// Station identity and position as reported by the provider.
///
/// Coordinates are the provider's authoritative echo, which may differ
/// slightly from the requested pair.
#[derive(Debug, Clone)]
pub struct FetchedStation {
    pub provider_id: i64,
    pub name: String,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// One weather observation as reported by the provider.
#[derive(Debug, Clone)]
pub struct FetchedReading {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: i32,
    pub pressure_hpa: i32,
    pub description: String,
    pub icon: String,
    pub wind_speed_ms: f64,
    pub captured_at: DateTime<Utc>,
}

/// The composed result of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedWeather {
    pub station: FetchedStation,
    pub reading: FetchedReading,
}

// --- OpenWeatherMap JSON response types ---

#[derive(Debug, Deserialize)]
struct OwmResponse {
    id: i64,
    name: String,
    /// Unix seconds of the observation; absent in some provider modes.
    dt: Option<i64>,
    coord: OwmCoord,
    sys: Option<OwmSys>,
    weather: Vec<OwmCondition>,
    main: OwmMain,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: i32,
    pressure: i32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

/// Reject coordinates outside the valid WGS84 ranges.
///
/// Shared by the client and the resolution path so a bad pair is refused
/// before any storage or network I/O. Non-finite values fail the range
/// checks as well.
pub(crate) fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ProviderError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ProviderError::InvalidCoordinate(format!(
            "latitude {} is outside [-90, 90]",
            latitude
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ProviderError::InvalidCoordinate(format!(
            "longitude {} is outside [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

/// Client for the OpenWeatherMap current-weather API.
#[derive(Debug, Clone)]
pub struct OwmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OwmClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, OWM_API_URL)
    }

    /// Build a client against a non-default endpoint (tests, proxies).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the current weather for a coordinate pair.
    ///
    /// Validates the coordinates before touching the network, then maps the
    /// provider's HTTP status and payload into a [`FetchedWeather`] or a
    /// typed [`ProviderError`].
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<FetchedWeather, ProviderError> {
        validate_coordinates(latitude, longitude)?;

        let url = format!(
            "{}?lat={:.6}&lon={:.6}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => {}
            reqwest::StatusCode::UNAUTHORIZED => return Err(ProviderError::Auth),
            reqwest::StatusCode::NOT_FOUND => return Err(ProviderError::NotFound),
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            status => return Err(ProviderError::Status(status.as_u16())),
        }

        let payload: OwmResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        map_response(payload)
    }
}

/// Map a deserialized provider payload into the fetched domain values.
///
/// The conditions list carries description and icon in its first entry;
/// an empty list means the payload is unusable.
fn map_response(payload: OwmResponse) -> Result<FetchedWeather, ProviderError> {
    let condition = payload.weather.first().ok_or_else(|| {
        ProviderError::MalformedResponse("empty weather conditions list".to_string())
    })?;

    let captured_at = payload
        .dt
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    let station = FetchedStation {
        provider_id: payload.id,
        name: payload.name.clone(),
        country: payload.sys.and_then(|s| s.country),
        latitude: payload.coord.lat,
        longitude: payload.coord.lon,
    };

    let reading = FetchedReading {
        temperature_c: payload.main.temp,
        feels_like_c: payload.main.feels_like,
        humidity_pct: payload.main.humidity,
        pressure_hpa: payload.main.pressure,
        description: condition.description.clone(),
        icon: condition.icon.clone(),
        wind_speed_ms: payload.wind.speed,
        captured_at,
    };

    Ok(FetchedWeather { station, reading })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "coord": { "lat": 46.99, "lon": 6.93 },
            "weather": [
                { "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }
            ],
            "main": {
                "temp": 18.3,
                "feels_like": 17.9,
                "pressure": 1017,
                "humidity": 62
            },
            "wind": { "speed": 3.6, "deg": 240 },
            "dt": 1756900800_i64,
            "sys": { "country": "CH" },
            "id": 2659496,
            "name": "Neuchatel"
        })
    }

    async fn client_for(server: &MockServer) -> OwmClient {
        OwmClient::with_base_url("test-key", &format!("{}/data/2.5/weather", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_maps_station_and_reading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "46.990000"))
            .and(query_param("lon", "6.930000"))
            .and(query_param("appid", "test-key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let fetched = client.fetch(46.99, 6.93).await.unwrap();

        assert_eq!(fetched.station.provider_id, 2659496);
        assert_eq!(fetched.station.name, "Neuchatel");
        assert_eq!(fetched.station.country.as_deref(), Some("CH"));
        assert_eq!(fetched.station.latitude, 46.99);
        assert_eq!(fetched.station.longitude, 6.93);

        assert_eq!(fetched.reading.temperature_c, 18.3);
        assert_eq!(fetched.reading.feels_like_c, 17.9);
        assert_eq!(fetched.reading.humidity_pct, 62);
        assert_eq!(fetched.reading.pressure_hpa, 1017);
        assert_eq!(fetched.reading.description, "broken clouds");
        assert_eq!(fetched.reading.icon, "04d");
        assert_eq!(fetched.reading.wind_speed_ms, 3.6);
        assert_eq!(fetched.reading.captured_at.timestamp(), 1756900800);
    }

    #[tokio::test]
    async fn test_fetch_without_country() {
        let server = MockServer::start().await;
        let mut body = sample_body();
        body.as_object_mut().unwrap().remove("sys");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let fetched = client.fetch(46.99, 6.93).await.unwrap();
        assert_eq!(fetched.station.country, None);
    }

    #[tokio::test]
    async fn test_fetch_empty_conditions_is_malformed() {
        let server = MockServer::start().await;
        let mut body = sample_body();
        body["weather"] = serde_json::json!([]);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(46.99, 6.93).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_401_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(46.99, 6.93).await.unwrap_err();
        assert!(matches!(err, ProviderError::Auth));
    }

    #[tokio::test]
    async fn test_fetch_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(0.0, -160.0).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound));
    }

    #[tokio::test]
    async fn test_fetch_429_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(46.99, 6.93).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_fetch_other_status_is_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(46.99, 6.93).await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(503)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_latitude_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(-91.0, 0.0).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCoordinate(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_longitude_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch(0.0, 181.0).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCoordinate(_)));
    }

    #[test]
    fn test_validate_coordinates_accepts_bounds() {
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_validate_coordinates_rejects_out_of_range() {
        assert!(validate_coordinates(90.0001, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.0001).is_err());
    }

    #[test]
    fn test_validate_coordinates_rejects_non_finite() {
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::INFINITY).is_err());
    }
}
