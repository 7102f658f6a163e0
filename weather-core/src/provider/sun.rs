use chrono::{NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::{Result, WeatherError},
    http::get_json,
    model::{Coordinates, SunTimes},
};

const SERVICE: &str = "sunrisesunset.io";

#[derive(Debug, Clone)]
pub struct SunriseSunsetClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct SunResponse {
    results: Option<SunResults>,
}

#[derive(Debug, Deserialize)]
struct SunResults {
    sunrise: Option<String>,
    sunset: Option<String>,
    timezone: Option<String>,
}

impl SunriseSunsetClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Local sunrise and sunset at `coordinates` on `date`.
    #[instrument(skip(self, coordinates), fields(%coordinates))]
    pub async fn times(&self, coordinates: Coordinates, date: NaiveDate) -> Result<SunTimes> {
        let url = format!("{}/json", self.base_url);
        let request = self.http.get(&url).query(&[
            ("lat", coordinates.latitude.to_string()),
            ("lng", coordinates.longitude.to_string()),
            ("date", date.to_string()),
        ]);

        let response: SunResponse = get_json(request, SERVICE).await?;
        let results = response.results.ok_or(WeatherError::MissingField {
            service: SERVICE,
            field: "results",
        })?;

        let sunrise = required_time(results.sunrise.as_deref(), "results.sunrise")?;
        let sunset = required_time(results.sunset.as_deref(), "results.sunset")?;

        Ok(SunTimes {
            date,
            sunrise,
            sunset,
            timezone: results.timezone.filter(|tz| !tz.trim().is_empty()),
        })
    }
}

fn required_time(value: Option<&str>, field: &'static str) -> Result<NaiveTime> {
    let text = value
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(WeatherError::MissingField {
            service: SERVICE,
            field,
        })?;

    parse_clock_time(text)
        .ok_or_else(|| WeatherError::parse(SERVICE, format!("unrecognised time '{text}' in {field}")))
}

/// Accepts "7:24:51 AM" as well as "7:24 AM".
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    ["%I:%M:%S %p", "%I:%M %p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_clock_formats() {
        assert_eq!(
            parse_clock_time("7:24:51 AM"),
            NaiveTime::from_hms_opt(7, 24, 51)
        );
        assert_eq!(parse_clock_time("6:41 PM"), NaiveTime::from_hms_opt(18, 41, 0));
        assert_eq!(parse_clock_time("12:05 AM"), NaiveTime::from_hms_opt(0, 5, 0));
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_clock_time("18:41").is_none());
        assert!(parse_clock_time("").is_none());
    }

    #[test]
    fn missing_time_is_reported_by_field() {
        let err = required_time(Some("  "), "results.sunset").unwrap_err();
        assert!(err.to_string().contains("results.sunset"));
    }
}
