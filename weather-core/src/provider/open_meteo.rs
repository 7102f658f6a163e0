use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    error::{Result, WeatherError},
    http::get_json,
    model::{Coordinates, ForecastSource, HistoricalAverage, WeatherForecast},
    units::kelvin_label,
};

use super::ForecastProvider;

const SERVICE: &str = "Open-Meteo";

/// Same-day averages over past years, for targets beyond any real forecast.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    historical_base_url: String,
    years_for_average: i32,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    /// Offset of the location's zone, present because of `timezone=auto`.
    utc_offset_seconds: Option<i32>,
    daily: Option<ArchiveDaily>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArchiveDaily {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    windspeed_10m_max: Vec<Option<f64>>,
}

impl OpenMeteoClient {
    pub fn new(historical_base_url: impl Into<String>, years_for_average: i32, http: Client) -> Self {
        Self {
            historical_base_url: historical_base_url.into(),
            years_for_average,
            http,
        }
    }

    /// Averages for the target's calendar day at the venue.
    ///
    /// The request window pads the UTC day by one on each side so the local day is
    /// always covered, whatever the venue's offset turns out to be.
    #[instrument(skip(self, coordinates), fields(%coordinates))]
    pub async fn averages(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
        current_year: i32,
    ) -> Result<HistoricalAverage> {
        let utc_day = target.date_naive();
        let dates = historical_dates(utc_day, current_year, self.years_for_average);
        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            warn!(month = utc_day.month(), day = utc_day.day(), "no valid historical dates");
            return Err(WeatherError::NoForecast(SERVICE));
        };
        let start = first.pred_opt().unwrap_or(*first);
        let end = last.succ_opt().unwrap_or(*last);

        info!(years = dates.len(), "fetching historical weather from Open-Meteo");

        let request = self.http.get(&self.historical_base_url).query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum,windspeed_10m_max"
                    .to_string(),
            ),
            ("temperature_unit", "fahrenheit".to_string()),
            ("windspeed_unit", "mph".to_string()),
            ("timezone", "auto".to_string()),
        ]);

        let response: ArchiveResponse = get_json(request, SERVICE).await?;
        let day = local_day(target, coordinates, response.utc_offset_seconds);
        let daily = response
            .daily
            .filter(|d| !d.time.is_empty())
            .ok_or(WeatherError::NoForecast(SERVICE))?;

        let average = average_for_day(&daily, day).ok_or(WeatherError::NoForecast(SERVICE))?;
        info!(
            %day,
            years = average.years_of_data,
            high = average.average_high,
            low = average.average_low,
            "calculated historical average"
        );
        Ok(average)
    }

    /// Historical forecast for `target`, with the averaged years counted back from `now`.
    pub async fn forecast_at(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<WeatherForecast> {
        let average = self.averages(coordinates, target, now.year()).await?;
        Ok(historical_forecast(&average))
    }
}

#[async_trait]
impl ForecastProvider for OpenMeteoClient {
    fn source(&self) -> ForecastSource {
        ForecastSource::HistoricalAverage
    }

    async fn forecast(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
    ) -> Result<WeatherForecast> {
        self.forecast_at(coordinates, target, Utc::now()).await
    }
}

/// Calendar day of `target` at the venue. Uses the offset Open-Meteo reports and
/// falls back to the nominal offset for the longitude (15° per hour).
fn local_day(
    target: DateTime<Utc>,
    coordinates: Coordinates,
    utc_offset_seconds: Option<i32>,
) -> NaiveDate {
    let offset = utc_offset_seconds
        .unwrap_or_else(|| (coordinates.longitude / 15.0).round() as i32 * 3600);

    FixedOffset::east_opt(offset)
        .map(|tz| target.with_timezone(&tz).date_naive())
        .unwrap_or_else(|| target.date_naive())
}

/// The target's month and day in each of the `years` years before `current_year`.
/// Feb 29 only survives in leap years.
pub fn historical_dates(target: NaiveDate, current_year: i32, years: i32) -> Vec<NaiveDate> {
    ((current_year - years)..current_year)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, target.month(), target.day()))
        .collect()
}

fn average_for_day(daily: &ArchiveDaily, target: NaiveDate) -> Option<HistoricalAverage> {
    let matching: Vec<usize> = daily
        .time
        .iter()
        .enumerate()
        .filter(|(_, d)| d.month() == target.month() && d.day() == target.day())
        .map(|(i, _)| i)
        .collect();

    if matching.is_empty() {
        warn!(month = target.month(), day = target.day(), "no matching dates in historical data");
        return None;
    }

    let pick = |series: &[Option<f64>]| -> Vec<f64> {
        matching
            .iter()
            .filter_map(|&i| series.get(i).copied().flatten())
            .collect()
    };

    let highs = pick(&daily.temperature_2m_max);
    let lows = pick(&daily.temperature_2m_min);
    if highs.is_empty() || lows.is_empty() {
        warn!("insufficient temperature data for historical average");
        return None;
    }

    Some(HistoricalAverage {
        average_high: mean(&highs)?.round() as i32,
        average_low: mean(&lows)?.round() as i32,
        average_precipitation: mean(&pick(&daily.precipitation_sum)),
        average_wind_speed: mean(&pick(&daily.windspeed_10m_max)),
        years_of_data: matching.len(),
        date: target,
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn historical_forecast(average: &HistoricalAverage) -> WeatherForecast {
    let temperature = (average.average_high + average.average_low) / 2;

    WeatherForecast {
        temperature,
        short_forecast: "Historical Average".to_string(),
        detailed_forecast: historical_details(average),
        wind_speed: average
            .average_wind_speed
            .map_or_else(|| "Unknown".to_string(), |w| format!("{} mph", w.round() as i32)),
        wind_direction: "Variable".to_string(),
        humidity: average
            .average_precipitation
            .filter(|p| *p > 0.0)
            .map(|p| format!("Avg {p:.1} in precipitation")),
        precipitation_probability: None,
        kelvin: kelvin_label(temperature),
        source: ForecastSource::HistoricalAverage,
    }
}

fn historical_details(average: &HistoricalAverage) -> String {
    let mut parts = vec![
        format!(
            "Based on {}-year historical average for {}",
            average.years_of_data,
            average.date.format("%B %-d")
        ),
        format!(
            "Average high: {}°F, Average low: {}°F",
            average.average_high, average.average_low
        ),
    ];
    if let Some(w) = average.average_wind_speed {
        parts.push(format!("Average wind: {} mph", w.round() as i32));
    }
    if let Some(p) = average.average_precipitation.filter(|p| *p > 0.01) {
        parts.push(format!("Average precipitation: {p:.2} inches"));
    }
    format!("{}.", parts.join(". "))
}
