use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};

use crate::{
    FetchError,
    model::{
        Coordinates, ForecastEntry, ForecastSet, LocationQuery, RequestOptions, Units,
        WeatherCondition, WeatherSnapshot,
    },
};

use super::{ReqwestTransport, Transport, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

/// Client for the OpenWeather current-weather and 3-hourly forecast endpoints.
///
/// Holds only its credential, base URL and transport; every call is
/// independent, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct OpenWeatherClient<T = ReqwestTransport> {
    api_key: String,
    base_url: String,
    transport: T,
}

impl OpenWeatherClient<ReqwestTransport> {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_transport(api_key, ReqwestTransport::new())
    }
}

impl<T: Transport> OpenWeatherClient<T> {
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn current_by_city(
        &self,
        city: &str,
        options: &RequestOptions,
    ) -> Result<WeatherSnapshot, FetchError> {
        let query = LocationQuery::city(city);
        self.fetch_current(&query, options).await
    }

    pub async fn current_by_postal_code(
        &self,
        code: &str,
        country: &str,
        options: &RequestOptions,
    ) -> Result<WeatherSnapshot, FetchError> {
        let query = LocationQuery::postal_code_in(code, country);
        self.fetch_current(&query, options).await
    }

    pub async fn current_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        options: &RequestOptions,
    ) -> Result<WeatherSnapshot, FetchError> {
        let query = LocationQuery::coordinates(latitude, longitude);
        self.fetch_current(&query, options).await
    }

    pub async fn forecast_by_city(
        &self,
        city: &str,
        options: &RequestOptions,
    ) -> Result<ForecastSet, FetchError> {
        let query = LocationQuery::city(city);
        self.fetch_forecast(&query, options).await
    }

    pub async fn forecast_by_postal_code(
        &self,
        code: &str,
        country: &str,
        options: &RequestOptions,
    ) -> Result<ForecastSet, FetchError> {
        let query = LocationQuery::postal_code_in(code, country);
        self.fetch_forecast(&query, options).await
    }

    pub async fn forecast_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        options: &RequestOptions,
    ) -> Result<ForecastSet, FetchError> {
        let query = LocationQuery::coordinates(latitude, longitude);
        self.fetch_forecast(&query, options).await
    }

    #[instrument(skip(self, options), fields(location = %query, units = %options.units))]
    pub async fn fetch_current(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<WeatherSnapshot, FetchError> {
        let parsed: OwCurrentResponse = self.get_json(CURRENT_ENDPOINT, query, options).await?;
        parsed.into_snapshot(options.units)
    }

    #[instrument(skip(self, options), fields(location = %query, units = %options.units))]
    pub async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<ForecastSet, FetchError> {
        let parsed: OwForecastResponse = self.get_json(FORECAST_ENDPOINT, query, options).await?;
        parsed.into_forecast_set(options.units)
    }

    /// One validated GET, decoded into `R`. Exactly one transport call on a valid query.
    async fn get_json<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<R, FetchError> {
        query.validate()?;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        let mut params = query.query_pairs();
        params.push(("appid", self.api_key.clone()));
        params.push(("units", options.units.as_str().to_string()));

        debug!(endpoint, kind = query.kind(), "sending OpenWeather request");

        let call = self.transport.get(&url, &params);
        let outcome = match options.deadline {
            // Dropping the timed-out future aborts the in-flight request.
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout),
            },
            None => call.await,
        };

        let res = match outcome {
            Ok(res) => res,
            Err(err) => {
                warn!(endpoint, error = %err, "OpenWeather request failed");
                return Err(err);
            }
        };

        if !res.is_success() {
            warn!(
                endpoint,
                status = res.status,
                "OpenWeather returned an error status"
            );
            return Err(FetchError::HttpStatus {
                code: res.status,
                body: res.body,
            });
        }

        serde_json::from_str(&res.body).map_err(|err| {
            warn!(endpoint, error = %err, "failed to decode OpenWeather response");
            FetchError::from(err)
        })
    }
}

impl<T> fmt::Debug for OpenWeatherClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Transport> WeatherProvider for OpenWeatherClient<T> {
    async fn current(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<WeatherSnapshot, FetchError> {
        self.fetch_current(query, options).await
    }

    async fn forecast(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<ForecastSet, FetchError> {
        self.fetch_forecast(query, options).await
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

impl From<OwCoord> for Coordinates {
    fn from(c: OwCoord) -> Self {
        Coordinates::new(c.lat, c.lon)
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
    main: String,
    description: String,
    icon: String,
}

impl From<OwWeather> for WeatherCondition {
    fn from(w: OwWeather) -> Self {
        WeatherCondition {
            code: w.id,
            group: w.main,
            description: w.description,
            icon_key: w.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: i32,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    coord: OwCoord,
    weather: Vec<OwWeather>,
    main: OwMain,
    wind: OwWind,
    clouds: OwClouds,
    dt: i64,
    sys: OwSys,
    name: String,
    timezone: Option<i32>,
}

impl OwCurrentResponse {
    fn into_snapshot(self, units: Units) -> Result<WeatherSnapshot, FetchError> {
        if self.weather.is_empty() {
            let reason = "current weather has no conditions".to_string();
            return Err(FetchError::Decode(reason));
        }

        Ok(WeatherSnapshot {
            coordinates: self.coord.into(),
            conditions: self.weather.into_iter().map(Into::into).collect(),
            units,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            wind_direction_degrees: self.wind.deg,
            cloudiness: self.clouds.all,
            observed_at: unix_to_utc(self.dt)?,
            location_name: self.name,
            country_code: self.sys.country,
            utc_offset_seconds: self.timezone,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwVolume {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastItem {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    clouds: OwClouds,
    wind: OwWind,
    pop: f64,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
}

impl OwForecastItem {
    fn into_entry(self) -> Result<ForecastEntry, FetchError> {
        Ok(ForecastEntry {
            timestamp: unix_to_utc(self.dt)?,
            conditions: self.weather.into_iter().map(Into::into).collect(),
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            wind_direction_degrees: self.wind.deg,
            cloudiness: self.clouds.all,
            precipitation_probability: self.pop,
            rain_volume_last_3h: self.rain.and_then(|v| v.three_hours),
            snow_volume_last_3h: self.snow.and_then(|v| v.three_hours),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    coord: Option<OwCoord>,
    timezone: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastItem>,
}

impl OwForecastResponse {
    fn into_forecast_set(self, units: Units) -> Result<ForecastSet, FetchError> {
        let entries = self
            .list
            .into_iter()
            .map(OwForecastItem::into_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ForecastSet {
            location_name: self.city.name,
            country_code: self.city.country,
            coordinates: self.city.coord.map(Into::into),
            utc_offset_seconds: self.city.timezone,
            units,
            entries,
        })
    }
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| FetchError::Decode(format!("timestamp {ts} is out of range")))
}
