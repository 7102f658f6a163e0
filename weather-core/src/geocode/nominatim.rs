use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::{
    error::{Result, WeatherError},
    http::get_json,
    model::Coordinates,
};

use super::{Geocoder, SearchHit};

const SERVICE: &str = "Nominatim";

/// OpenStreetMap Nominatim. Free, but limited to one request per second.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    rate_limit_delay: Duration,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, rate_limit_delay: Duration, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limit_delay,
            http,
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Coordinates> {
        tokio::time::sleep(self.rate_limit_delay).await;

        info!("geocoding location via Nominatim");
        let url = format!("{}/search", self.base_url);
        let request = self
            .http
            .get(&url)
            .query(&[("q", location), ("format", "json"), ("limit", "1")]);

        let hits: Vec<SearchHit> = get_json(request, SERVICE).await?;
        let Some(first) = hits.first() else {
            warn!("no coordinates found via Nominatim");
            return Err(WeatherError::NoResults(location.to_string()));
        };

        first.coordinates(SERVICE)
    }
}
