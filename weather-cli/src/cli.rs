use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Select, Text};
use weather_core::{
    Config, LocationQuery, OpenWeatherClient, RequestOptions, Units, WeatherProvider,
    client_from_config, daily_summaries_at_location, daily_summaries_local,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather",
    version,
    about = "Current weather and daily forecasts from OpenWeather"
)]
pub struct Cli {
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default settings.
    Configure,

    /// Show current conditions.
    Current {
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Show one forecast line per day.
    Forecast {
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        request: RequestArgs,
        /// Group days by this machine's time zone instead of the location's.
        #[arg(long)]
        local_time: bool,
    },

    /// Current conditions followed by the daily forecast.
    Report {
        #[command(flatten)]
        location: LocationArgs,
        #[command(flatten)]
        request: RequestArgs,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = true)]
pub struct LocationArgs {
    /// City name, e.g. "Saint Paul".
    #[arg(long, conflicts_with_all = ["zip", "lat", "lon"])]
    pub city: Option<String>,

    /// 5-digit zip code (or a postal code with --country).
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub zip: Option<String>,

    /// Country for --zip; defaults to the configured country.
    #[arg(long, requires = "zip")]
    pub country: Option<String>,

    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    pub fn to_query(&self, default_country: &str) -> anyhow::Result<LocationQuery> {
        match (&self.city, &self.zip, self.lat, self.lon) {
            (Some(city), _, _, _) => Ok(LocationQuery::city(city)),
            (None, Some(zip), _, _) => {
                let country = self.country.as_deref().unwrap_or(default_country);
                Ok(LocationQuery::postal_code_in(zip, country))
            }
            (None, None, Some(lat), Some(lon)) => Ok(LocationQuery::coordinates(lat, lon)),
            _ => Err(anyhow!("Specify a location with --city, --zip or --lat/--lon.")),
        }
    }
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// imperial, metric or standard; defaults to the configured units.
    #[arg(long)]
    pub units: Option<Units>,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl RequestArgs {
    pub fn options(&self, config: &Config) -> RequestOptions {
        let mut options = config.request_options();
        if let Some(units) = self.units {
            options.units = units;
        }
        if let Some(secs) = self.timeout {
            options.deadline = Some(Duration::from_secs(secs));
        }
        options
    }
}

/// What a fetch subcommand resolved from flags and stored configuration.
struct FetchPlan {
    client: OpenWeatherClient,
    query: LocationQuery,
    options: RequestOptions,
    json: bool,
}

impl FetchPlan {
    fn load(location: &LocationArgs, request: &RequestArgs) -> anyhow::Result<Self> {
        Self::resolve(&Config::load()?, location, request)
    }

    fn resolve(
        config: &Config,
        location: &LocationArgs,
        request: &RequestArgs,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: client_from_config(config)?,
            query: location.to_query(&config.country)?,
            options: request.options(config),
            json: request.json,
        })
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { location, request } => {
                let plan = FetchPlan::load(&location, &request)?;
                show_current(plan).await
            }
            Command::Forecast {
                location,
                request,
                local_time,
            } => {
                let plan = FetchPlan::load(&location, &request)?;
                show_forecast(plan, local_time).await
            }
            Command::Report { location, request } => {
                let plan = FetchPlan::load(&location, &request)?;
                show_report(plan).await
            }
        }
    }
}

async fn show_current(plan: FetchPlan) -> anyhow::Result<()> {
    let query = &plan.query;
    let snapshot = plan
        .client
        .current(query, &plan.options)
        .await
        .with_context(|| format!("Could not fetch current weather for {query}"))?;

    output::print_snapshot(&snapshot, plan.json)
}

async fn show_forecast(plan: FetchPlan, local_time: bool) -> anyhow::Result<()> {
    let query = &plan.query;
    let set = plan
        .client
        .forecast(query, &plan.options)
        .await
        .with_context(|| format!("Could not fetch forecast for {query}"))?;

    let days = if local_time {
        daily_summaries_local(&set)
    } else {
        daily_summaries_at_location(&set)
    };

    output::print_forecast(&set, &days, plan.json)
}

async fn show_report(plan: FetchPlan) -> anyhow::Result<()> {
    let query = &plan.query;
    let report = plan
        .client
        .report(query, &plan.options)
        .await
        .with_context(|| format!("Could not fetch weather for {query}"))?;

    output::print_report(&report, plan.json)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty."));
    }
    config.set_api_key(api_key);

    let start = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    let country = Text::new("Default country for zip codes:")
        .with_default(&config.country)
        .prompt()?;
    config.country = country.trim().to_lowercase();

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}
