use std::net::IpAddr;

use accuweather_core::{
    AirQualityPeriod, AlertHorizon, ApiVariant, ClimoKind, ClimoPeriod, Config, Connection,
    ForecastHorizon, ObservationHorizon,
};
use anyhow::{Context, anyhow, bail};
use chrono::{Month, NaiveDate};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use inquire::{CustomUserError, Password, PasswordDisplayMode, Select, Text, validator::Validation};
use serde_json::Value;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "accuweather", version, about = "AccuWeather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print the mapped result as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log requests and responses to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API key to use instead of the configured one.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Talk to the production host instead of the development one.
    #[arg(long, global = true)]
    pub production: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and connection defaults.
    Configure,

    #[command(flatten)]
    Query(Query),
}

/// Commands that talk to the API.
#[derive(Debug, Subcommand)]
pub enum Query {
    /// Resolve the location nearest to a coordinate pair.
    Locate {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Free-text location search.
    Search {
        query: String,

        /// Two-letter country code to restrict the search to.
        #[arg(long)]
        country: Option<String>,
    },

    /// Look a location up by postcode.
    Postcode { country: String, postcode: String },

    /// Locate an IP address.
    Ip { address: IpAddr },

    /// Look a location up by its key.
    Key { lkey: u64 },

    /// Current conditions for a location key.
    Current {
        lkey: u64,

        /// now, 6h or 24h.
        #[arg(long, default_value = "now")]
        horizon: ObservationHorizon,

        /// Ask for the short payload only.
        #[arg(long = "no-details", action = ArgAction::SetFalse)]
        details: bool,
    },

    /// Hourly or daily forecast for a location key.
    Forecast {
        lkey: u64,

        /// 1h, 12h, 24h, 72h, 120h, 240h, 1d, 5d, 10d, 15d, 25d or 45d.
        #[arg(long, default_value = "5d")]
        horizon: ForecastHorizon,

        /// Ask for the short payload only. Forecast mapping needs the detailed one.
        #[arg(long = "no-details", action = ArgAction::SetFalse)]
        details: bool,

        /// Ask for imperial units.
        #[arg(long)]
        imperial: bool,
    },

    /// Air quality readings for a location key.
    AirQuality {
        lkey: u64,

        #[arg(long)]
        yesterday: bool,
    },

    /// Climatological actuals, records or normals.
    Climo {
        kind: ClimoArg,
        lkey: u64,

        /// Single day, YYYY-MM-DD.
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<NaiveDate>,

        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// Climatological summary of one month.
    Summary {
        lkey: u64,
        year: i32,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=12))]
        month: u8,
    },

    /// Weather alerts for the next days.
    Alerts {
        lkey: u64,

        /// 1, 5, 10, 15 or 25.
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ClimoArg {
    Actuals,
    Records,
    Normals,
}

impl From<ClimoArg> for ClimoKind {
    fn from(arg: ClimoArg) -> Self {
        match arg {
            ClimoArg::Actuals => ClimoKind::Actuals,
            ClimoArg::Records => ClimoKind::Records,
            ClimoArg::Normals => ClimoKind::Normals,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Query(query) => {
                let conn = connect(self.api_key, self.production)?;
                execute(&conn, query, self.json).await
            }
        }
    }
}

fn connect(api_key: Option<String>, production: bool) -> anyhow::Result<Connection> {
    let config = Config::load()?;
    let mut settings = config.connection_config(api_key);
    if production {
        settings.variant = ApiVariant::Production;
    }

    if settings.api_key.is_none() {
        bail!(
            "No API key configured.\n\
             Hint: run `accuweather configure`, set ACCUWEATHER_APIKEY or pass --api-key."
        );
    }

    debug!(variant = ?settings.variant, language = %settings.language, "connecting");
    Ok(Connection::new(settings)?)
}

async fn execute(conn: &Connection, query: Query, json: bool) -> anyhow::Result<()> {
    match query {
        Query::Locate { lat, lon } => {
            let loc = conn.loc_geoposition(lat, lon).await?;
            render::emit(json, &loc, render::location)
        }
        Query::Search { query, country } => {
            let set = conn.loc_string(&query, country.as_deref()).await?;
            render::emit(json, &set, render::location_set)
        }
        Query::Postcode { country, postcode } => {
            let loc = conn.loc_postcode(&country, &postcode).await?;
            render::emit(json, &loc, render::location)
        }
        Query::Ip { address } => {
            let loc = conn.loc_ip(address).await?;
            render::emit(json, &loc, render::location)
        }
        Query::Key { lkey } => {
            let loc = conn.loc_lkey(lkey).await?;
            render::emit(json, &loc, render::location)
        }
        Query::Current {
            lkey,
            horizon,
            details,
        } => {
            let obs = conn
                .current_conditions(lkey.into(), horizon, details)
                .await?;
            render::emit(json, &obs, render::observations)
        }
        Query::Forecast {
            lkey,
            horizon,
            details,
            imperial,
        } => {
            let forecast = conn.forecast(horizon, lkey, details, !imperial).await?;
            render::emit(json, &forecast, render::forecast)
        }
        Query::AirQuality { lkey, yesterday } => {
            let period = if yesterday {
                AirQualityPeriod::Yesterday
            } else {
                AirQualityPeriod::Current
            };
            let aq = conn.air_quality(lkey, period).await?;
            render::emit(json, &aq, render::air_quality)
        }
        Query::Climo {
            kind,
            lkey,
            date,
            start,
            end,
        } => {
            let period = match (date, start, end) {
                (Some(date), _, _) => ClimoPeriod::Date(date),
                (None, Some(start), Some(end)) => ClimoPeriod::range(start, end)?,
                _ => bail!("Pass either --date or both --start and --end."),
            };
            let payload = conn.climo(kind.into(), lkey, period).await?;
            print_raw(&payload)
        }
        Query::Summary { lkey, year, month } => {
            let month = Month::try_from(month)
                .map_err(|_| anyhow!("Invalid month: {month}"))?;
            let payload = conn.climo_month_summary(lkey, year, month).await?;
            print_raw(&payload)
        }
        Query::Alerts { lkey, days } => {
            let horizon = AlertHorizon::try_from(days)?;
            let payload = conn.alerts(lkey, horizon).await?;
            print_raw(&payload)
        }
    }
}

fn print_raw(payload: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("AccuWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_validator(|key: &str| -> Result<Validation, CustomUserError> {
            Ok(if key.trim().chars().count() == 32 {
                Validation::Valid
            } else {
                Validation::Invalid("API keys are 32 characters long".into())
            })
        })
        .prompt()
        .context("Failed to read API key")?;

    let variant = Select::new("API host:", vec!["development", "production"])
        .prompt()
        .context("Failed to read API host")?;

    let language = Text::new("Language:")
        .with_default(&config.language)
        .with_validator(|lang: &str| -> Result<Validation, CustomUserError> {
            Ok(if lang.chars().count() == 2 {
                Validation::Valid
            } else {
                Validation::Invalid("Use a two-letter language code".into())
            })
        })
        .prompt()
        .context("Failed to read language")?;

    config.api_key = Some(api_key.trim().to_string());
    config.variant = if variant == "production" {
        ApiVariant::Production
    } else {
        ApiVariant::Development
    };
    config.language = language;
    config.save()?;

    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
