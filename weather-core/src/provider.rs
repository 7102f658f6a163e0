use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{convert::TryFrom, fmt::Debug};

use crate::{
    error::Result,
    model::{Coordinates, ForecastSource, WeatherForecast},
};

pub mod nws;
pub mod open_meteo;
pub mod sun;
pub mod tomorrow;

/// Services that need an API key in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    GeocodeMaps,
    Tomorrow,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::GeocodeMaps => "geocodemaps",
            ProviderId::Tomorrow => "tomorrow",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::GeocodeMaps, ProviderId::Tomorrow]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "geocodemaps" | "geocode-maps" => Ok(ProviderId::GeocodeMaps),
            "tomorrow" => Ok(ProviderId::Tomorrow),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: geocodemaps, tomorrow."
            )),
        }
    }
}

/// A source that can produce a forecast for a point in time.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    fn source(&self) -> ForecastSource;

    async fn forecast(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
    ) -> Result<WeatherForecast>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("Tomorrow").unwrap(), ProviderId::Tomorrow);
        assert_eq!(
            ProviderId::try_from("GEOCODE-MAPS").unwrap(),
            ProviderId::GeocodeMaps
        );
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("openweather").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
        assert!(err.to_string().contains("geocodemaps, tomorrow"));
    }
}
