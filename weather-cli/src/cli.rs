use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_core::{Config, ProviderId, WeatherService};

use crate::output;

/// Default lead time for `lookup`, matching a game two days out.
const DEFAULT_LEAD_DAYS: i64 = 2;
/// NWS grid cell covering Lincoln, NE.
const DEFAULT_VALIDATION_GRID: &str = "gridpoints/OAX/56,40/forecast";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "gameday-weather", version, about = "Game-day weather lookup")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a keyed provider.
    Configure {
        /// Provider short name: "geocodemaps" or "tomorrow".
        provider: String,
    },

    /// Geocode a location and forecast it at the target time.
    Lookup {
        /// City or venue, e.g. "Iowa City, IA".
        location: String,

        /// Target time: RFC 3339, or "YYYY-MM-DD HH:MM" in local time.
        #[arg(long, conflicts_with = "in_days")]
        at: Option<String>,

        /// Target this many days from now.
        #[arg(long)]
        in_days: Option<i64>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Fetch an NWS forecast and check the shape of its fields.
    Validate {
        /// Forecast URL; defaults to the Lincoln, NE grid cell.
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Sunrise and sunset for a location.
    Sun {
        location: String,

        /// Date as YYYY-MM-DD; defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider)?,
            Command::Lookup {
                location,
                at,
                in_days,
                json,
            } => {
                let now = Utc::now();
                let target = match at {
                    Some(at) => parse_target(&at)?,
                    None => days_from(now, in_days.unwrap_or(DEFAULT_LEAD_DAYS))?,
                };

                let service = service()?;
                let lookup = service
                    .lookup(&location, target, now)
                    .await
                    .with_context(|| format!("Weather lookup failed for '{location}'"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&lookup)?);
                } else {
                    println!("{}", output::lookup(&lookup)?);
                }
            }
            Command::Validate { url, json } => {
                let service = service()?;
                let url = url.unwrap_or_else(|| {
                    format!("{}/{}", service.nws().base_url(), DEFAULT_VALIDATION_GRID)
                });

                let validation = service
                    .validate(&url, Utc::now())
                    .await
                    .with_context(|| format!("Failed to validate forecast at {url}"))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&validation)?);
                } else {
                    println!("{}", output::validation(&validation)?);
                }

                if !validation.passed() {
                    let failed = validation.first_period.failures().count();
                    bail!("{failed} forecast field check(s) failed");
                }
            }
            Command::Sun { location, date } => {
                let date = match date {
                    Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                        .with_context(|| format!("Invalid date '{d}', expected YYYY-MM-DD"))?,
                    None => Local::now().date_naive(),
                };

                let service = service()?;
                let coordinates = service.coordinates(&location).await?;
                let times = service.sun_times(coordinates, date).await?;
                println!("{}", output::sun(&location, &times));
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}

fn service() -> anyhow::Result<WeatherService> {
    let config = Config::load()?;
    WeatherService::new(&config).context("Failed to set up HTTP client")
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;
    if config.is_provider_configured(id) {
        println!("An API key for {id} is already stored; entering a new one replaces it.");
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("No API key entered")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key for '{id}' must not be empty");
    }

    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!(
        "Saved API key for {id} to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn days_from(now: DateTime<Utc>, days: i64) -> anyhow::Result<DateTime<Utc>> {
    TimeDelta::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("--in-days {days} is out of range"))
}

/// Parse `--at`: RFC 3339 first, then local wall-clock forms.
fn parse_target(input: &str) -> anyhow::Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| {
            anyhow!("Invalid time '{input}'. Use RFC 3339 or \"YYYY-MM-DD HH:MM\" (local time).")
        })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("'{input}' does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_target_keeps_instant() {
        let t = parse_target("2025-10-18T14:30:00-05:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2025-10-18T19:30:00+00:00");
    }

    #[test]
    fn local_target_roundtrips_through_local_zone() {
        let t = parse_target("2025-10-18 14:30").unwrap();
        let local = t.with_timezone(&Local);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2025-10-18 14:30");
    }

    #[test]
    fn garbage_target_is_rejected() {
        let err = parse_target("next saturday").unwrap_err();
        assert!(err.to_string().contains("Invalid time"));
    }

    #[test]
    fn in_days_adds_whole_days() {
        let now: DateTime<Utc> = "2025-10-17T12:00:00Z".parse().unwrap();
        let t = days_from(now, 3).unwrap();
        assert_eq!(t.to_rfc3339(), "2025-10-20T12:00:00+00:00");

        let t = days_from(now, -1).unwrap();
        assert_eq!(t.to_rfc3339(), "2025-10-16T12:00:00+00:00");
    }

    #[test]
    fn huge_in_days_is_an_error() {
        let now: DateTime<Utc> = "2025-10-17T12:00:00Z".parse().unwrap();

        let err = days_from(now, i64::MAX).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        // representable as a TimeDelta, but past chrono's last date
        assert!(days_from(now, 100_000_000).is_err());
    }

    #[test]
    fn cli_parses_lookup_flags() {
        let cli = Cli::try_parse_from([
            "gameday-weather",
            "-vv",
            "lookup",
            "Iowa City, IA",
            "--in-days",
            "3",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Lookup {
                location,
                in_days,
                json,
                at,
            } => {
                assert_eq!(location, "Iowa City, IA");
                assert_eq!(in_days, Some(3));
                assert!(json);
                assert!(at.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn at_and_in_days_conflict() {
        let res = Cli::try_parse_from([
            "gameday-weather",
            "lookup",
            "Lincoln, NE",
            "--at",
            "2025-10-18 14:30",
            "--in-days",
            "1",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
