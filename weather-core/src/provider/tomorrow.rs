use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    error::{Result, WeatherError},
    http::get_json,
    model::{Coordinates, ForecastSource, WeatherForecast},
    units::{compass_direction, kelvin_label, tomorrow_code_description},
};

use super::ForecastProvider;

const SERVICE: &str = "Tomorrow.io";
const FIELDS: &str =
    "temperature,windSpeed,windDirection,humidity,precipitationProbability,weatherCode";

/// Hourly forecasts from Tomorrow.io, usable up to 120 hours out.
#[derive(Debug, Clone)]
pub struct TomorrowClient {
    base_url: String,
    api_key: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct TomorrowResponse {
    #[serde(default)]
    timelines: Timelines,
}

#[derive(Debug, Default, Deserialize)]
struct Timelines {
    #[serde(default)]
    hourly: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
struct TimelineEntry {
    time: DateTime<Utc>,
    values: TimelineValues,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TimelineValues {
    temperature: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    humidity: Option<f64>,
    precipitation_probability: Option<f64>,
    weather_code: Option<i32>,
}

impl TomorrowClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        }
    }
}

#[async_trait]
impl ForecastProvider for TomorrowClient {
    fn source(&self) -> ForecastSource {
        ForecastSource::Tomorrow
    }

    #[instrument(skip(self, coordinates), fields(%coordinates))]
    async fn forecast(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
    ) -> Result<WeatherForecast> {
        let url = format!("{}/weather/forecast", self.base_url);
        let location = format!("{},{}", coordinates.latitude, coordinates.longitude);

        let request = self.http.get(&url).query(&[
            ("location", location.as_str()),
            ("apikey", self.api_key.as_str()),
            ("timesteps", "hourly"),
            ("fields", FIELDS),
            ("units", "imperial"),
        ]);

        let response: TomorrowResponse = get_json(request, SERVICE).await?;

        let entry = closest_entry(&response.timelines.hourly, target).ok_or_else(|| {
            warn!("Tomorrow.io returned no hourly timeline");
            WeatherError::NoForecast(SERVICE)
        })?;

        debug!(time = %entry.time, "closest Tomorrow.io entry");
        Ok(forecast_from_values(&entry.values))
    }
}

/// Entry nearest the target by whole hours; the earliest wins a tie.
fn closest_entry(entries: &[TimelineEntry], target: DateTime<Utc>) -> Option<&TimelineEntry> {
    entries
        .iter()
        .min_by_key(|e| (e.time - target).num_hours().abs())
}

fn forecast_from_values(values: &TimelineValues) -> WeatherForecast {
    let temperature = values.temperature.map_or(0, |t| t.round() as i32);

    WeatherForecast {
        temperature,
        short_forecast: tomorrow_code_description(values.weather_code.unwrap_or(0)).to_string(),
        detailed_forecast: detailed_forecast(values),
        wind_speed: format!("{} mph", values.wind_speed.map_or(0, |w| w.round() as i32)),
        wind_direction: compass_direction(values.wind_direction.unwrap_or(0.0)).to_string(),
        humidity: values.humidity.map(|h| format!("{}% humidity", h.round() as i32)),
        precipitation_probability: values.precipitation_probability.map(|p| p.round() as i32),
        kelvin: kelvin_label(temperature),
        source: ForecastSource::Tomorrow,
    }
}

fn detailed_forecast(values: &TimelineValues) -> String {
    let mut parts = Vec::new();

    if let Some(t) = values.temperature {
        parts.push(format!("Temperature around {}°F", t.round() as i32));
    }
    if let Some(w) = values.wind_speed {
        parts.push(format!("winds at {} mph", w.round() as i32));
    }
    if let Some(h) = values.humidity {
        parts.push(format!("{}% humidity", h.round() as i32));
    }
    if let Some(p) = values.precipitation_probability.filter(|p| *p > 0.0) {
        parts.push(format!("{}% chance of precipitation", p.round() as i32));
    }

    if parts.is_empty() {
        "Weather details unavailable.".to_string()
    } else {
        format!("{}.", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(time: &str, temperature: f64) -> TimelineEntry {
        TimelineEntry {
            time: time.parse().unwrap(),
            values: TimelineValues {
                temperature: Some(temperature),
                ..Default::default()
            },
        }
    }

    #[test]
    fn closest_entry_prefers_nearest_hour() {
        let entries = vec![
            entry("2025-10-18T17:00:00Z", 61.0),
            entry("2025-10-18T18:00:00Z", 63.0),
            entry("2025-10-18T19:00:00Z", 64.0),
        ];
        let target: DateTime<Utc> = "2025-10-18T18:10:00Z".parse().unwrap();

        let e = closest_entry(&entries, target).unwrap();
        assert_eq!(e.values.temperature, Some(63.0));
    }

    #[test]
    fn closest_entry_of_empty_timeline_is_none() {
        let target: DateTime<Utc> = "2025-10-18T18:10:00Z".parse().unwrap();
        assert!(closest_entry(&[], target).is_none());

        let empty: TomorrowResponse = serde_json::from_str(r#"{"timelines":{}}"#).unwrap();
        assert!(empty.timelines.hourly.is_empty());
    }

    #[test]
    fn closest_entry_breaks_ties_toward_first() {
        let entries = vec![
            entry("2025-10-18T17:00:00Z", 61.0),
            entry("2025-10-18T18:00:00Z", 63.0),
        ];
        // both within the same whole hour of the target
        let target: DateTime<Utc> = "2025-10-18T17:30:00Z".parse().unwrap();

        let e = closest_entry(&entries, target).unwrap();
        assert_eq!(e.values.temperature, Some(61.0));
    }

    #[test]
    fn full_values_build_sentence() {
        let values = TimelineValues {
            temperature: Some(58.6),
            wind_speed: Some(11.2),
            wind_direction: Some(200.0),
            humidity: Some(64.0),
            precipitation_probability: Some(15.0),
            weather_code: Some(1101),
        };

        let f = forecast_from_values(&values);
        assert_eq!(f.temperature, 59);
        assert_eq!(f.short_forecast, "Partly Cloudy");
        assert_eq!(f.wind_speed, "11 mph");
        assert_eq!(f.wind_direction, "S");
        assert_eq!(f.humidity.as_deref(), Some("64% humidity"));
        assert_eq!(f.precipitation_probability, Some(15));
        assert_eq!(
            f.detailed_forecast,
            "Temperature around 59°F, winds at 11 mph, 64% humidity, 15% chance of precipitation."
        );
        assert_eq!(f.kelvin, "288K");
    }

    #[test]
    fn zero_precipitation_is_left_out_of_details() {
        let values = TimelineValues {
            temperature: Some(70.0),
            precipitation_probability: Some(0.0),
            ..Default::default()
        };

        let f = forecast_from_values(&values);
        assert_eq!(f.detailed_forecast, "Temperature around 70°F.");
        assert_eq!(f.precipitation_probability, Some(0));
    }

    #[test]
    fn empty_values_use_defaults() {
        let f = forecast_from_values(&TimelineValues::default());
        assert_eq!(f.temperature, 0);
        assert_eq!(f.short_forecast, "Unknown");
        assert_eq!(f.wind_speed, "0 mph");
        assert_eq!(f.wind_direction, "N");
        assert_eq!(f.detailed_forecast, "Weather details unavailable.");
    }
}
