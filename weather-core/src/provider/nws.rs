use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    error::{Result, WeatherError},
    http::get_json,
    model::{Coordinates, ForecastPeriod, ForecastSource, WeatherForecast},
    period::{extract, select_period},
};

use super::ForecastProvider;

const SERVICE: &str = "NWS";

/// Client for api.weather.gov: `/points` for the grid reference, then the forecast it links to.
#[derive(Debug, Clone)]
pub struct NwsClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<ForecastPeriod>,
}

impl NwsClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve the forecast URL for the grid cell containing `coordinates`.
    #[instrument(skip(self, coordinates), fields(%coordinates))]
    pub async fn forecast_url(&self, coordinates: Coordinates) -> Result<String> {
        let url = format!(
            "{}/points/{:.4},{:.4}",
            self.base_url, coordinates.latitude, coordinates.longitude
        );

        let points: PointsResponse = get_json(self.http.get(&url), SERVICE).await?;

        points
            .properties
            .forecast
            .filter(|u| !u.is_empty())
            .ok_or(WeatherError::MissingField {
                service: SERVICE,
                field: "properties.forecast",
            })
    }

    #[instrument(skip(self))]
    pub async fn periods(&self, forecast_url: &str) -> Result<Vec<ForecastPeriod>> {
        let forecast: ForecastResponse = get_json(self.http.get(forecast_url), SERVICE).await?;
        info!(periods = forecast.properties.periods.len(), "retrieved NWS forecast periods");
        Ok(forecast.properties.periods)
    }

    /// The forecast document as untyped JSON, for shape validation.
    #[instrument(skip(self))]
    pub async fn raw_forecast(&self, forecast_url: &str) -> Result<serde_json::Value> {
        get_json(self.http.get(forecast_url), SERVICE).await
    }

    pub async fn periods_for(&self, coordinates: Coordinates) -> Result<Vec<ForecastPeriod>> {
        let url = self.forecast_url(coordinates).await?;
        info!(%url, "found NWS forecast URL");
        self.periods(&url).await
    }
}

#[async_trait]
impl ForecastProvider for NwsClient {
    fn source(&self) -> ForecastSource {
        ForecastSource::Nws
    }

    async fn forecast(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
    ) -> Result<WeatherForecast> {
        let periods = self.periods_for(coordinates).await?;
        let matched = select_period(&periods, target).ok_or(WeatherError::NoForecast(SERVICE))?;
        info!(name = %matched.period.name, kind = ?matched.kind, "selected NWS period");
        Ok(extract(matched.period))
    }
}
