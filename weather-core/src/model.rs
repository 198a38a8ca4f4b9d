use std::{fmt, str::FromStr, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Unit family the upstream API reports temperatures and speeds in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Imperial, Units::Metric, Units::Standard]
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Imperial => "°F",
            Units::Metric => "°C",
            Units::Standard => "K",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }

    /// Convert a Fahrenheit threshold into this unit family.
    pub fn convert_fahrenheit(&self, value: f64) -> f64 {
        let celsius = (value - 32.0) * 5.0 / 9.0;
        match self {
            Units::Imperial => value,
            Units::Metric => celsius,
            Units::Standard => celsius + 273.15,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "imperial" => Ok(Units::Imperial),
            "metric" => Ok(Units::Metric),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: imperial, metric, standard."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// The three ways a location can be named to the upstream API.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    PostalCode { code: String, country: String },
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub const DEFAULT_COUNTRY: &'static str = "us";

    pub fn city(name: impl Into<String>) -> Self {
        LocationQuery::City(name.into())
    }

    /// Postal code with the default `us` country hint.
    pub fn postal_code(code: impl Into<String>) -> Self {
        Self::postal_code_in(code, Self::DEFAULT_COUNTRY)
    }

    pub fn postal_code_in(code: impl Into<String>, country: impl Into<String>) -> Self {
        LocationQuery::PostalCode {
            code: code.into(),
            country: country.into(),
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        LocationQuery::Coordinates(Coordinates::new(latitude, longitude))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LocationQuery::City(_) => "city",
            LocationQuery::PostalCode { .. } => "postal_code",
            LocationQuery::Coordinates(_) => "coordinates",
        }
    }

    /// Pre-call format check. Nothing is sent upstream for a query that fails here.
    pub fn validate(&self) -> Result<(), FetchError> {
        match self {
            LocationQuery::City(name) => {
                if name.trim().is_empty() {
                    return Err(invalid("city name must not be empty"));
                }
            }
            LocationQuery::PostalCode { code, country } => {
                let code = code.trim();
                let country = country.trim();
                if country.is_empty() {
                    return Err(invalid("country code must not be empty"));
                }
                if country.eq_ignore_ascii_case("us") {
                    if !is_us_zip(code) {
                        return Err(invalid(format!(
                            "'{code}' is not a valid 5-digit zip code"
                        )));
                    }
                } else if code.is_empty() {
                    return Err(invalid("postal code must not be empty"));
                }
            }
            LocationQuery::Coordinates(c) => {
                let (lat, lon) = (c.latitude, c.longitude);
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    return Err(invalid(format!("latitude {lat} is outside [-90, 90]")));
                }
                if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                    return Err(invalid(format!("longitude {lon} is outside [-180, 180]")));
                }
            }
        }
        Ok(())
    }

    /// Location part of the upstream query string.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::City(name) => vec![("q", name.trim().to_string())],
            LocationQuery::PostalCode { code, country } => {
                let zip = format!("{},{}", code.trim(), country.trim().to_lowercase());
                vec![("zip", zip)]
            }
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::City(name) => f.write_str(name.trim()),
            LocationQuery::PostalCode { code, country } => {
                write!(f, "{} ({})", code.trim(), country.trim().to_uppercase())
            }
            LocationQuery::Coordinates(c) => fmt::Display::fmt(c, f),
        }
    }
}

fn invalid(message: impl Into<String>) -> FetchError {
    FetchError::Validation(message.into())
}

fn is_us_zip(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_digit())
}

/// Per-call knobs: unit family and an optional deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestOptions {
    pub units: Units,
    pub deadline: Option<Duration>,
}

impl RequestOptions {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub code: i32,
    /// Condition group, e.g. "Rain".
    pub group: String,
    pub description: String,
    pub icon_key: String,
}

/// Current conditions at one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub coordinates: Coordinates,
    pub conditions: Vec<WeatherCondition>,
    pub units: Units,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i32,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction_degrees: i32,
    pub cloudiness: u8,
    pub observed_at: DateTime<Utc>,
    pub location_name: String,
    pub country_code: String,
    /// Offset of the location from UTC, when the upstream reports it.
    pub utc_offset_seconds: Option<i32>,
}

impl WeatherSnapshot {
    /// First (primary) condition. Never absent on a decoded snapshot.
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub conditions: Vec<WeatherCondition>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: i32,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction_degrees: i32,
    pub cloudiness: u8,
    /// Probability of precipitation in [0, 1].
    pub precipitation_probability: f64,
    pub rain_volume_last_3h: Option<f64>,
    pub snow_volume_last_3h: Option<f64>,
}

impl ForecastEntry {
    pub fn primary_condition(&self) -> Option<&WeatherCondition> {
        self.conditions.first()
    }
}

/// 3-hourly forecast for one location, chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSet {
    pub location_name: String,
    pub country_code: String,
    pub coordinates: Option<Coordinates>,
    pub utc_offset_seconds: Option<i32>,
    pub units: Units,
    pub entries: Vec<ForecastEntry>,
}

/// One entry chosen to stand for a whole calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub representative_entry: ForecastEntry,
}

/// Current conditions plus a forecast that was allowed to fail.
#[derive(Debug)]
pub struct WeatherReport {
    pub current: WeatherSnapshot,
    pub forecast: Option<ForecastSet>,
    /// Set when the forecast half failed; the snapshot is still valid.
    pub forecast_error: Option<FetchError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed: Units = units.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_units_error() {
        let err = "kelvinish".parse::<Units>().unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn default_units_are_imperial() {
        assert_eq!(Units::default(), Units::Imperial);
        assert_eq!(RequestOptions::default().units, Units::Imperial);
        assert!(RequestOptions::default().deadline.is_none());
    }

    #[test]
    fn fahrenheit_thresholds_convert() {
        assert_eq!(Units::Imperial.convert_fahrenheit(32.0), 32.0);
        assert!((Units::Metric.convert_fahrenheit(32.0)).abs() < 1e-9);
        assert!((Units::Standard.convert_fahrenheit(212.0) - 373.15).abs() < 1e-9);
    }

    fn is_valid(query: LocationQuery) -> bool {
        query.validate().is_ok()
    }

    #[test]
    fn zip_validation_accepts_five_digits_only() {
        assert!(is_valid(LocationQuery::postal_code("55101")));
        assert!(is_valid(LocationQuery::postal_code(" 55101 ")));

        for bad in ["5510", "551011", "ABCDE", "", "5510a"] {
            let err = LocationQuery::postal_code(bad).validate().unwrap_err();
            assert!(
                matches!(err, FetchError::Validation(_)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn non_us_postal_codes_only_need_content() {
        assert!(is_valid(LocationQuery::postal_code_in("SW1A 1AA", "gb")));
        assert!(!is_valid(LocationQuery::postal_code_in("  ", "gb")));
        assert!(!is_valid(LocationQuery::postal_code_in("55101", " ")));
    }

    #[test]
    fn city_must_not_be_blank() {
        assert!(is_valid(LocationQuery::city("Saint Paul")));
        assert!(matches!(
            LocationQuery::city("   ").validate(),
            Err(FetchError::Validation(_))
        ));
    }

    #[test]
    fn coordinates_must_be_in_range() {
        assert!(is_valid(LocationQuery::coordinates(90.0, -180.0)));
        assert!(is_valid(LocationQuery::coordinates(-90.0, 180.0)));
        assert!(!is_valid(LocationQuery::coordinates(90.1, 0.0)));
        assert!(!is_valid(LocationQuery::coordinates(0.0, 180.5)));
        assert!(!is_valid(LocationQuery::coordinates(f64::NAN, 0.0)));
    }

    #[test]
    fn query_pairs_follow_upstream_shape() {
        assert_eq!(
            LocationQuery::city(" Paris ").query_pairs(),
            vec![("q", "Paris".to_string())]
        );
        assert_eq!(
            LocationQuery::postal_code("55101").query_pairs(),
            vec![("zip", "55101,us".to_string())]
        );
        assert_eq!(
            LocationQuery::coordinates(44.95, -93.09).query_pairs(),
            vec![
                ("lat", "44.95".to_string()),
                ("lon", "-93.09".to_string()),
            ]
        );
    }
}
