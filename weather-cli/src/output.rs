//! Human-readable and JSON rendering of fetch results.

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use weather_core::{
    ConditionKind, DailySummary, ForecastSet, WeatherReport, WeatherSnapshot, WeatherTip,
    daily_summaries_at_location,
};

#[derive(Serialize)]
struct ForecastOutput<'a> {
    location_name: &'a str,
    country_code: &'a str,
    units: weather_core::Units,
    days: &'a [DailySummary],
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    current: &'a WeatherSnapshot,
    days: Option<&'a [DailySummary]>,
    forecast_error: Option<String>,
}

pub fn print_snapshot(snapshot: &WeatherSnapshot, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        return print_json(snapshot);
    }
    println!("{}", format_snapshot(snapshot));
    Ok(())
}

pub fn print_forecast(
    set: &ForecastSet,
    days: &[DailySummary],
    as_json: bool,
) -> anyhow::Result<()> {
    if as_json {
        return print_json(&ForecastOutput {
            location_name: &set.location_name,
            country_code: &set.country_code,
            units: set.units,
            days,
        });
    }
    println!("{}", format_forecast(set, days));
    Ok(())
}

pub fn print_report(report: &WeatherReport, as_json: bool) -> anyhow::Result<()> {
    let days = report.forecast.as_ref().map(daily_summaries_at_location);

    if as_json {
        return print_json(&ReportOutput {
            current: &report.current,
            days: days.as_deref(),
            forecast_error: report.forecast_error.as_ref().map(ToString::to_string),
        });
    }

    println!("{}", format_snapshot(&report.current));
    println!();
    match (&report.forecast, &days) {
        (Some(set), Some(days)) => println!("{}", format_forecast(set, days)),
        _ => println!("Forecast unavailable."),
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

pub fn format_snapshot(s: &WeatherSnapshot) -> String {
    let temp = s.units.temperature_label();
    let observed = local_time(s.observed_at, s.utc_offset_seconds);
    let condition = match s.primary_condition() {
        Some(c) => {
            let kind = ConditionKind::from_icon_key(&c.icon_key);
            format!("{} ({})", kind.label(), c.description)
        }
        None => "Unknown".to_string(),
    };

    format!(
        "{}, {} at {}\n\
         {condition}\n\
         Temperature: {:.0}{temp} (feels like {:.0}{temp}), low {:.0}{temp} / high {:.0}{temp}\n\
         Humidity: {}%  Pressure: {} hPa  Clouds: {}%\n\
         Wind: {:.1} {} from {}°\n\
         Tip: {}",
        s.location_name,
        s.country_code,
        observed.format("%Y-%m-%d %H:%M"),
        s.temperature,
        s.feels_like,
        s.temp_min,
        s.temp_max,
        s.humidity,
        s.pressure,
        s.cloudiness,
        s.wind_speed,
        s.units.speed_label(),
        s.wind_direction_degrees,
        WeatherTip::for_snapshot(s).message(),
    )
}

pub fn format_forecast(set: &ForecastSet, days: &[DailySummary]) -> String {
    let temp = set.units.temperature_label();
    let heading = format!("Forecast for {}, {}", set.location_name, set.country_code);
    let mut lines = vec![heading];

    if days.is_empty() {
        lines.push("No forecast data available.".to_string());
    }

    for day in days {
        let e = &day.representative_entry;
        let condition = e
            .primary_condition()
            .map(|c| c.description.as_str())
            .unwrap_or("unknown");
        lines.push(format!(
            "{:<15} {:>4.0}{temp} / {:>4.0}{temp}  {:>3.0}% precip  {condition}",
            day.date.format("%a %b %d"),
            e.temp_max,
            e.temp_min,
            e.precipitation_probability * 100.0,
        ));
    }

    lines.join("\n")
}

fn local_time(at: DateTime<Utc>, offset_seconds: Option<i32>) -> DateTime<FixedOffset> {
    let offset = offset_seconds
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset)
}
