use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::{
    error::{Result, WeatherError},
    http::get_json,
    model::Coordinates,
};

use super::{Geocoder, SearchHit};

const SERVICE: &str = "geocode.maps.co";

/// geocode.maps.co, the keyed primary geocoder.
#[derive(Debug, Clone)]
pub struct GeocodeMapsGeocoder {
    base_url: String,
    api_key: String,
    http: Client,
}

impl GeocodeMapsGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        }
    }
}

#[async_trait]
impl Geocoder for GeocodeMapsGeocoder {
    fn name(&self) -> &'static str {
        "geocodemaps"
    }

    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Coordinates> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::NotConfigured("geocodemaps"));
        }

        info!("geocoding location via geocode.maps.co");
        let url = format!("{}/search", self.base_url);
        let request = self
            .http
            .get(&url)
            .query(&[("q", location), ("api_key", self.api_key.as_str())]);

        let hits: Vec<SearchHit> = get_json(request, SERVICE).await?;
        let Some(first) = hits.first() else {
            warn!("no coordinates found via geocode.maps.co");
            return Err(WeatherError::NoResults(location.to_string()));
        };

        first.coordinates(SERVICE)
    }
}
