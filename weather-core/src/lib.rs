//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - An OpenWeather client over a pluggable HTTP transport
//! - Shared domain models (snapshots, forecasts, daily summaries)
//! - Reduction of 3-hourly forecasts into daily summaries
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod forecast;
pub mod icons;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::FetchError;
pub use forecast::{daily_summaries, daily_summaries_at_location, daily_summaries_local};
pub use icons::{ConditionKind, WeatherTip};
pub use model::{
    Coordinates, DailySummary, ForecastEntry, ForecastSet, LocationQuery, RequestOptions, Units,
    WeatherCondition, WeatherReport, WeatherSnapshot,
};
pub use provider::{
    HttpResponse, ReqwestTransport, Transport, WeatherProvider, client_from_config,
    openweather::OpenWeatherClient,
};
