//! Picking the NWS forecast period that covers a target time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    model::{ForecastPeriod, ForecastSource, WeatherForecast},
    units::kelvin_label,
};

/// Index used when no period covers the target, roughly two days out.
const FALLBACK_INDEX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Target instant lies strictly inside the period.
    Containing,
    /// Target date lies within the period's start and end dates.
    SameDay,
    Fallback,
}

#[derive(Debug, Clone, Copy)]
pub struct PeriodMatch<'a> {
    pub period: &'a ForecastPeriod,
    pub index: usize,
    pub kind: MatchKind,
}

pub fn select_period(periods: &[ForecastPeriod], target: DateTime<Utc>) -> Option<PeriodMatch<'_>> {
    let last = periods.len().checked_sub(1)?;

    let parsed: Vec<_> = periods
        .iter()
        .map(|p| p.start().zip(p.end()))
        .collect();

    let containing = parsed.iter().position(|span| {
        span.is_some_and(|(start, end)| start < target && target < end)
    });
    if let Some(index) = containing {
        debug!(index, "target falls inside forecast period");
        return Some(PeriodMatch {
            period: &periods[index],
            index,
            kind: MatchKind::Containing,
        });
    }

    let same_day = parsed.iter().position(|span| {
        span.is_some_and(|(start, end)| {
            let day = target.with_timezone(start.offset()).date_naive();
            start.date_naive() <= day && day <= end.date_naive()
        })
    });
    if let Some(index) = same_day {
        debug!(index, "target date matches forecast period");
        return Some(PeriodMatch {
            period: &periods[index],
            index,
            kind: MatchKind::SameDay,
        });
    }

    let index = FALLBACK_INDEX.min(last);
    info!(index, name = %periods[index].name, "no period covers target, using fallback period");
    Some(PeriodMatch {
        period: &periods[index],
        index,
        kind: MatchKind::Fallback,
    })
}

/// Pull the fields a notification needs out of a period, defaulting anything absent.
pub fn extract(period: &ForecastPeriod) -> WeatherForecast {
    let temperature = period.temperature.unwrap_or(0);
    let precipitation_probability = period.precipitation_chance();

    WeatherForecast {
        temperature,
        short_forecast: non_empty_or(&period.short_forecast, "Unknown"),
        detailed_forecast: non_empty_or(&period.detailed_forecast, "No details available"),
        wind_speed: non_empty_or(&period.wind_speed, "Unknown"),
        wind_direction: non_empty_or(&period.wind_direction, "Unknown"),
        humidity: precipitation_probability.map(|p| format!("{p}% chance of precipitation")),
        precipitation_probability,
        kelvin: kelvin_label(temperature),
        source: ForecastSource::Nws,
    }
}

fn non_empty_or(value: &Option<String>, default: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}
