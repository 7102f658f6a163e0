//! Shape checks for a raw NWS forecast document.
//!
//! Works on untyped JSON so a field of the wrong type shows up as a failed
//! check instead of a deserialisation error.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, WeatherError};

const SERVICE: &str = "NWS";
const SUMMARY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Passed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub outcome: Outcome,
}

impl Check {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            outcome: Outcome::Passed(detail.into()),
        }
    }

    fn fail(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            outcome: Outcome::Failed(reason.into()),
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed(_))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<Check>,
    /// Whether `now` falls inside the period; `None` when its times don't parse.
    pub current_period: Option<bool>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// One line of the period listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub name: String,
    pub temperature: String,
    pub conditions: String,
    pub start: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastValidation {
    pub period_count: usize,
    pub first_period: ValidationReport,
    pub periods: Vec<PeriodSummary>,
}

impl ForecastValidation {
    pub fn passed(&self) -> bool {
        self.first_period.passed()
    }
}

pub fn validate_forecast(doc: &Value, now: DateTime<Utc>) -> Result<ForecastValidation> {
    let periods = doc
        .pointer("/properties/periods")
        .and_then(Value::as_array)
        .ok_or(WeatherError::MissingField {
            service: SERVICE,
            field: "properties.periods",
        })?;

    let first = periods.first().ok_or(WeatherError::NoForecast(SERVICE))?;

    Ok(ForecastValidation {
        period_count: periods.len(),
        first_period: validate_period(first, now),
        periods: periods.iter().take(SUMMARY_LIMIT).map(summarize).collect(),
    })
}

pub fn validate_period(period: &Value, now: DateTime<Utc>) -> ValidationReport {
    let text = |key: &str| period.get(key).and_then(Value::as_str);
    let mut checks = Vec::with_capacity(6);

    checks.push(match period.get("temperature").and_then(Value::as_i64) {
        Some(t) if t > 0 => Check::pass("temperature", format!("{t}°F")),
        _ => Check::fail(
            "temperature",
            format!("expected a positive integer, got {}", shown(period.get("temperature"))),
        ),
    });

    checks.push(match text("shortForecast") {
        Some(s) if !s.is_empty() => Check::pass("shortForecast", s),
        _ => Check::fail("shortForecast", "missing or empty"),
    });

    checks.push(match text("detailedForecast") {
        Some(s) if s.chars().count() > 10 => Check::pass("detailedForecast", preview(s, 50)),
        _ => Check::fail("detailedForecast", "missing or shorter than 11 characters"),
    });

    checks.push(match (text("windSpeed"), text("windDirection")) {
        (Some(speed), Some(dir)) if !speed.is_empty() && !dir.is_empty() => {
            Check::pass("wind", format!("{speed} {dir}"))
        }
        _ => Check::fail("wind", "windSpeed or windDirection missing"),
    });

    let start_text = text("startTime").filter(|s| !s.is_empty());
    let end_text = text("endTime").filter(|s| !s.is_empty());

    checks.push(match (start_text, end_text) {
        (Some(start), Some(end)) => Check::pass("timePeriod", format!("{start} to {end}")),
        _ => Check::fail("timePeriod", "startTime or endTime missing"),
    });

    let parsed = match (start_text, end_text) {
        (Some(start), Some(end)) => parse_span(start, end),
        _ => Err("nothing to parse".to_string()),
    };

    let current_period = parsed.as_ref().ok().map(|(start, end)| *start <= now && now <= *end);

    checks.push(match parsed {
        Ok((start, end)) => Check::pass("dateParsing", format!("{start} / {end}")),
        Err(reason) => Check::fail("dateParsing", reason),
    });

    ValidationReport {
        checks,
        current_period,
    }
}

fn parse_span(
    start: &str,
    end: &str,
) -> std::result::Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), String> {
    let parse = |s: &str| {
        DateTime::parse_from_rfc3339(s).map_err(|e| format!("cannot parse '{s}': {e}"))
    };
    Ok((parse(start)?, parse(end)?))
}

fn summarize(period: &Value) -> PeriodSummary {
    let field = |key: &str| match period.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    };

    PeriodSummary {
        name: field("name"),
        temperature: field("temperature"),
        conditions: field("shortForecast"),
        start: field("startTime"),
    }
}

fn shown(value: Option<&Value>) -> String {
    value.map_or_else(|| "nothing".to_string(), Value::to_string)
}

fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn good_period() -> Value {
        json!({
            "number": 1,
            "name": "This Afternoon",
            "startTime": "2025-10-17T13:00:00-05:00",
            "endTime": "2025-10-17T18:00:00-05:00",
            "temperature": 68,
            "windSpeed": "10 mph",
            "windDirection": "S",
            "shortForecast": "Sunny",
            "detailedForecast": "Sunny, with a high near 68. South wind around 10 mph."
        })
    }

    fn now() -> DateTime<Utc> {
        "2025-10-17T20:00:00Z".parse().unwrap()
    }

    #[test]
    fn well_formed_period_passes() {
        let report = validate_period(&good_period(), now());
        assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
        assert_eq!(report.checks.len(), 6);
        assert_eq!(report.current_period, Some(true));
    }

    #[test]
    fn string_temperature_fails() {
        let mut p = good_period();
        p["temperature"] = json!("68");

        let report = validate_period(&p, now());
        let failed: Vec<_> = report.failures().map(|c| c.name).collect();
        assert_eq!(failed, vec!["temperature"]);
    }

    #[test]
    fn freezing_temperature_is_rejected() {
        let mut p = good_period();
        p["temperature"] = json!(0);
        assert!(!validate_period(&p, now()).passed());
    }

    #[test]
    fn short_details_and_missing_wind_fail() {
        let mut p = good_period();
        p["detailedForecast"] = json!("Sunny.");
        p.as_object_mut().unwrap().remove("windDirection");

        let report = validate_period(&p, now());
        let failed: Vec<_> = report.failures().map(|c| c.name).collect();
        assert_eq!(failed, vec!["detailedForecast", "wind"]);
    }

    #[test]
    fn bad_timestamps_fail_parsing_only() {
        let mut p = good_period();
        p["endTime"] = json!("tomorrow-ish");

        let report = validate_period(&p, now());
        let failed: Vec<_> = report.failures().map(|c| c.name).collect();
        assert_eq!(failed, vec!["dateParsing"]);
        assert_eq!(report.current_period, None);
    }

    #[test]
    fn outside_current_period_is_reported() {
        let report = validate_period(&good_period(), "2025-10-18T20:00:00Z".parse().unwrap());
        assert!(report.passed());
        assert_eq!(report.current_period, Some(false));
    }

    #[test]
    fn forecast_requires_periods_array() {
        let err = validate_forecast(&json!({ "properties": {} }), now()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingField { .. }));

        let err = validate_forecast(&json!({ "properties": { "periods": [] } }), now()).unwrap_err();
        assert!(matches!(err, WeatherError::NoForecast(_)));
    }

    #[test]
    fn forecast_summarizes_first_five() {
        let periods: Vec<Value> = (0..7)
            .map(|i| {
                let mut p = good_period();
                p["name"] = json!(format!("Period {i}"));
                p
            })
            .collect();
        let mut doc = json!({ "properties": { "periods": periods } });
        doc["properties"]["periods"][1]
            .as_object_mut()
            .unwrap()
            .remove("temperature");

        let v = validate_forecast(&doc, now()).unwrap();
        assert_eq!(v.period_count, 7);
        assert_eq!(v.periods.len(), 5);
        assert_eq!(v.periods[0].temperature, "68");
        assert_eq!(v.periods[1].temperature, "N/A");
        assert_eq!(v.periods[4].name, "Period 4");
        assert!(v.passed());
    }

    #[test]
    fn preview_is_char_safe() {
        assert_eq!(preview("héllo world", 5), "héllo...");
        assert_eq!(preview("short", 50), "short");
    }
}
