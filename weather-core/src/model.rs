use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Only for literals known to be in range.
    pub(crate) const fn known(latitude: f64, longitude: f64) -> Self {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeValue {
    pub value: Option<f64>,
}

/// One named slice of an NWS multi-period forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub number: u32,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub temperature: Option<i32>,
    pub temperature_unit: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub short_forecast: Option<String>,
    pub detailed_forecast: Option<String>,
    pub probability_of_precipitation: Option<QuantitativeValue>,
}

impl ForecastPeriod {
    pub fn start(&self) -> Option<DateTime<chrono::FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.start_time).ok()
    }

    pub fn end(&self) -> Option<DateTime<chrono::FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.end_time).ok()
    }

    pub fn precipitation_chance(&self) -> Option<i32> {
        self.probability_of_precipitation
            .as_ref()
            .and_then(|p| p.value)
            .map(|v| v.round() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    Tomorrow,
    Nws,
    HistoricalAverage,
}

impl ForecastSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastSource::Tomorrow => "Tomorrow.io",
            ForecastSource::Nws => "National Weather Service",
            ForecastSource::HistoricalAverage => "Open-Meteo historical average",
        }
    }
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather at the target time, normalised across sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    /// Degrees Fahrenheit.
    pub temperature: i32,
    pub short_forecast: String,
    pub detailed_forecast: String,
    pub wind_speed: String,
    pub wind_direction: String,
    pub humidity: Option<String>,
    pub precipitation_probability: Option<i32>,
    /// Temperature in kelvin, e.g. "289K".
    pub kelvin: String,
    pub source: ForecastSource,
}

impl fmt::Display for WeatherForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Temperature: {}°F ({})", self.temperature, self.kelvin)?;
        writeln!(f, "Conditions:  {}", self.short_forecast)?;
        writeln!(f, "Wind:        {} {}", self.wind_speed, self.wind_direction)?;
        if let Some(p) = self.precipitation_probability {
            writeln!(f, "Precip:      {p}% chance")?;
        }
        if let Some(h) = &self.humidity {
            writeln!(f, "Humidity:    {h}")?;
        }
        writeln!(f, "Details:     {}", self.detailed_forecast)?;
        write!(f, "Source:      {}", self.source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAverage {
    pub average_high: i32,
    pub average_low: i32,
    /// Inches.
    pub average_precipitation: Option<f64>,
    /// Miles per hour.
    pub average_wind_speed: Option<f64>,
    pub years_of_data: usize,
    /// Calendar day at the venue the average describes.
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub date: NaiveDate,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub timezone: Option<String>,
}

/// Result of a full location lookup.
#[derive(Debug, Clone, Serialize)]
pub struct Lookup {
    pub location: String,
    pub coordinates: Coordinates,
    pub target: DateTime<Utc>,
    pub forecast: WeatherForecast,
}
