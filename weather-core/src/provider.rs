use crate::{
    Config, FetchError,
    model::{ForecastSet, LocationQuery, RequestOptions, WeatherReport, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use tracing::warn;

pub mod openweather;

/// Raw upstream answer: status plus undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single GET with query parameters. Implementations hold no per-call state.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, FetchError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<WeatherSnapshot, FetchError>;

    async fn forecast(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<ForecastSet, FetchError>;

    /// Current conditions, then the forecast for the same location.
    ///
    /// Only a failed current fetch fails the report. A failed forecast is
    /// kept in `forecast_error` next to the snapshot.
    async fn report(
        &self,
        query: &LocationQuery,
        options: &RequestOptions,
    ) -> Result<WeatherReport, FetchError> {
        let current = self.current(query, options).await?;

        let (forecast, forecast_error) = match self.forecast(query, options).await {
            Ok(set) => (Some(set), None),
            Err(err) => {
                warn!(
                    location = %query,
                    error = %err,
                    "forecast unavailable, keeping current conditions"
                );
                (None, Some(err))
            }
        };

        Ok(WeatherReport {
            current,
            forecast,
            forecast_error,
        })
    }
}

/// Construct a client from resolved configuration.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.resolve_api_key()?;
    Ok(OpenWeatherClient::new(api_key))
}
