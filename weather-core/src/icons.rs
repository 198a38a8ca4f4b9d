//! Display classification of upstream icon keys (`01d`, `10n`, ...).

use serde::{Deserialize, Serialize};

use crate::model::{Units, WeatherSnapshot};

/// Temperatures above this (°F) on a clear day call for the heat tip.
const HOT_ABOVE_F: f64 = 85.0;
/// Temperatures below this (°F) call for the cold tip when nothing else applies.
const COLD_BELOW_F: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Overcast,
    ShowerRain,
    RainDay,
    RainNight,
    Thunderstorm,
    Snow,
    Mist,
}

impl ConditionKind {
    /// Unknown keys fall back to a clear day.
    pub fn from_icon_key(key: &str) -> Self {
        match key {
            "01d" => Self::ClearDay,
            "01n" => Self::ClearNight,
            "02d" => Self::PartlyCloudyDay,
            "02n" => Self::PartlyCloudyNight,
            "03d" | "03n" => Self::Cloudy,
            "04d" | "04n" => Self::Overcast,
            "09d" | "09n" => Self::ShowerRain,
            "10d" => Self::RainDay,
            "10n" => Self::RainNight,
            "11d" | "11n" => Self::Thunderstorm,
            "13d" | "13n" => Self::Snow,
            "50d" | "50n" => Self::Mist,
            _ => Self::ClearDay,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ClearDay | Self::ClearNight => "Clear",
            Self::PartlyCloudyDay | Self::PartlyCloudyNight => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::Overcast => "Overcast",
            Self::ShowerRain => "Showers",
            Self::RainDay | Self::RainNight => "Rain",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherTip {
    Hot,
    Sunny,
    Rainy,
    Cloudy,
    Snow,
    Thunderstorm,
    Cold,
}

impl WeatherTip {
    /// Pick a tip from the icon family first, then from temperature.
    ///
    /// `temperature` is read in `units`; the thresholds are defined in °F.
    pub fn from_icon(key: &str, temperature: f64, units: Units) -> Self {
        let family = key.get(..2).unwrap_or("");

        match family {
            "01" if temperature > units.convert_fahrenheit(HOT_ABOVE_F) => Self::Hot,
            "01" => Self::Sunny,
            "09" | "10" => Self::Rainy,
            "02" | "03" | "04" => Self::Cloudy,
            "13" => Self::Snow,
            "11" => Self::Thunderstorm,
            _ if temperature < units.convert_fahrenheit(COLD_BELOW_F) => Self::Cold,
            _ => Self::Sunny,
        }
    }

    pub fn for_snapshot(snapshot: &WeatherSnapshot) -> Self {
        let key = snapshot
            .primary_condition()
            .map(|c| c.icon_key.as_str())
            .unwrap_or("");
        Self::from_icon(key, snapshot.temperature, snapshot.units)
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Hot => "It's hot out there. Stay hydrated and find some shade.",
            Self::Sunny => "A good day to be outside.",
            Self::Rainy => "Take an umbrella.",
            Self::Cloudy => "Cloudy skies. A light jacket may help.",
            Self::Snow => "Snow expected. Dress warmly and drive carefully.",
            Self::Thunderstorm => "Thunderstorms around. Stay indoors if you can.",
            Self::Cold => "Freezing temperatures. Bundle up.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(key: &str) -> ConditionKind {
        ConditionKind::from_icon_key(key)
    }

    fn tip(key: &str, temperature: f64, units: Units) -> WeatherTip {
        WeatherTip::from_icon(key, temperature, units)
    }

    #[test]
    fn icon_keys_map_to_kinds() {
        assert_eq!(kind("01d"), ConditionKind::ClearDay);
        assert_eq!(kind("01n"), ConditionKind::ClearNight);
        assert_eq!(kind("03n"), ConditionKind::Cloudy);
        assert_eq!(kind("10n"), ConditionKind::RainNight);
        assert_eq!(kind("50d"), ConditionKind::Mist);
    }

    #[test]
    fn unknown_icon_keys_fall_back_to_clear_day() {
        assert_eq!(kind("99x"), ConditionKind::ClearDay);
        assert_eq!(kind(""), ConditionKind::ClearDay);
    }

    #[test]
    fn clear_sky_tips_depend_on_heat() {
        assert_eq!(tip("01d", 90.0, Units::Imperial), WeatherTip::Hot);
        assert_eq!(tip("01d", 80.0, Units::Imperial), WeatherTip::Sunny);
        assert_eq!(tip("01d", 31.0, Units::Metric), WeatherTip::Hot);
        assert_eq!(tip("01n", 300.0, Units::Standard), WeatherTip::Sunny);
    }

    #[test]
    fn condition_families_win_over_temperature() {
        assert_eq!(tip("10d", 10.0, Units::Imperial), WeatherTip::Rainy);
        assert_eq!(tip("04n", 10.0, Units::Imperial), WeatherTip::Cloudy);
        assert_eq!(tip("13d", 10.0, Units::Imperial), WeatherTip::Snow);
        assert_eq!(tip("11d", 10.0, Units::Imperial), WeatherTip::Thunderstorm);
    }

    #[test]
    fn cold_applies_only_to_other_conditions() {
        assert_eq!(tip("50d", 20.0, Units::Imperial), WeatherTip::Cold);
        assert_eq!(tip("50d", -5.0, Units::Metric), WeatherTip::Cold);
        assert_eq!(tip("50d", 40.0, Units::Imperial), WeatherTip::Sunny);
    }
}
