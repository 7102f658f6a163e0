//! Plain-text rendering for command results.

use std::fmt::{self, Write};

use chrono::Local;
use weather_core::{
    Lookup, SunTimes,
    validate::{ForecastValidation, Outcome},
};

pub fn lookup(lookup: &Lookup) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let local = lookup.target.with_timezone(&Local);

    writeln!(out, "{} ({})", lookup.location, lookup.coordinates)?;
    writeln!(out, "Target:      {}", local.format("%b %d, %Y at %-I:%M %p"))?;
    write!(out, "{}", lookup.forecast)?;
    Ok(out)
}

pub fn validation(v: &ForecastValidation) -> Result<String, fmt::Error> {
    let mut out = String::new();

    writeln!(out, "{} forecast periods", v.period_count)?;
    for check in &v.first_period.checks {
        let (mark, text) = match &check.outcome {
            Outcome::Passed(detail) => ("ok  ", detail),
            Outcome::Failed(reason) => ("FAIL", reason),
        };
        writeln!(out, "  [{mark}] {:<16} {text}", check.name)?;
    }

    match v.first_period.current_period {
        Some(true) => writeln!(out, "Current time falls within the first period")?,
        Some(false) => writeln!(out, "Current time is outside the first period")?,
        None => {}
    }

    writeln!(out, "Periods:")?;
    for (i, p) in v.periods.iter().enumerate() {
        writeln!(
            out,
            "  {}. {}: {}°F, {} (starts {})",
            i + 1,
            p.name,
            p.temperature,
            p.conditions,
            p.start
        )?;
    }

    out.push_str(if v.passed() {
        "All checks passed"
    } else {
        "Some checks failed"
    });
    Ok(out)
}

pub fn sun(location: &str, times: &SunTimes) -> String {
    let zone = times.timezone.as_deref().unwrap_or("local time");
    format!(
        "{location} on {}\nSunrise: {}\nSunset:  {}\n({zone})",
        times.date,
        times.sunrise.format("%-I:%M %p"),
        times.sunset.format("%-I:%M %p"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::validate::{Check, PeriodSummary, ValidationReport};

    fn report(outcome: Outcome) -> ForecastValidation {
        ForecastValidation {
            period_count: 14,
            first_period: ValidationReport {
                checks: vec![Check {
                    name: "temperature",
                    outcome,
                }],
                current_period: Some(true),
            },
            periods: vec![PeriodSummary {
                name: "Tonight".into(),
                temperature: "52".into(),
                conditions: "Mostly Clear".into(),
                start: "2025-10-17T18:00:00-05:00".into(),
            }],
        }
    }

    #[test]
    fn passing_validation_renders_every_section() {
        let text = validation(&report(Outcome::Passed("52°F".into()))).unwrap();

        assert!(text.starts_with("14 forecast periods\n"));
        assert!(text.contains("[ok  ] temperature"));
        assert!(text.contains("Current time falls within the first period"));
        assert!(text.contains("1. Tonight: 52°F, Mostly Clear"));
        assert!(text.ends_with("All checks passed"));
    }

    #[test]
    fn failing_check_is_marked() {
        let text = validation(&report(Outcome::Failed("missing".into()))).unwrap();

        assert!(text.contains("[FAIL] temperature"));
        assert!(text.ends_with("Some checks failed"));
    }
}
