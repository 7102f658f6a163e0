use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{info, warn};

use crate::{
    error::{Result, WeatherError},
    model::Coordinates,
};

pub mod geocode_maps;
pub mod hardcoded;
pub mod nominatim;

pub use geocode_maps::GeocodeMapsGeocoder;
pub use hardcoded::hardcoded_coordinates;
pub use nominatim::NominatimGeocoder;

/// Turns a free-form place name into coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    async fn geocode(&self, location: &str) -> Result<Coordinates>;
}

/// One entry of the OSM-style `/search` array both geocoders return.
/// Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    lat: serde_json::Value,
    lon: serde_json::Value,
}

impl SearchHit {
    pub(crate) fn coordinates(&self, service: &'static str) -> Result<Coordinates> {
        let lat = parse_degrees(&self.lat, service, "lat")?;
        let lon = parse_degrees(&self.lon, service, "lon")?;
        Coordinates::new(lat, lon)
    }
}

fn parse_degrees(value: &serde_json::Value, service: &'static str, field: &str) -> Result<f64> {
    let parsed = match value {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| WeatherError::parse(service, format!("invalid `{field}`: {value}")))
}

/// Hardcoded venues first, then each network geocoder in order.
///
/// Failures of all but the last geocoder are logged and skipped.
#[derive(Debug, Default)]
pub struct ChainGeocoder {
    geocoders: Vec<Box<dyn Geocoder>>,
}

impl ChainGeocoder {
    pub fn new(geocoders: Vec<Box<dyn Geocoder>>) -> Self {
        Self { geocoders }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.geocoders.iter().map(|g| g.name()).collect()
    }

    pub async fn resolve(&self, location: &str) -> Result<Coordinates> {
        if let Some(coords) = hardcoded_coordinates(location) {
            info!(location, "using hardcoded coordinates");
            return Ok(coords);
        }

        let mut last_err = WeatherError::NoResults(location.to_string());
        for geocoder in &self.geocoders {
            match geocoder.geocode(location).await {
                Ok(coords) => {
                    info!(location, geocoder = geocoder.name(), %coords, "found coordinates");
                    return Ok(coords);
                }
                Err(e) => {
                    warn!(location, geocoder = geocoder.name(), error = %e, "geocoder failed, trying next");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[derive(Debug)]
    struct Fixed {
        result: Option<(f64, f64)>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Geocoder for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn geocode(&self, location: &str) -> Result<Coordinates> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Some((lat, lon)) => Coordinates::new(lat, lon),
                None => Err(WeatherError::NoResults(location.to_string())),
            }
        }
    }

    fn fixed(result: Option<(f64, f64)>) -> (Box<dyn Geocoder>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Fixed {
                result,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn hardcoded_venue_skips_network() {
        let (g, calls) = fixed(Some((1.0, 1.0)));
        let chain = ChainGeocoder::new(vec![g]);

        let coords = chain.resolve("Iowa City, IA").await.unwrap();
        assert_eq!(coords.latitude, 41.6589);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_through_to_next_geocoder() {
        let (first, first_calls) = fixed(None);
        let (second, second_calls) = fixed(Some((39.7392, -104.9903)));
        let chain = ChainGeocoder::new(vec![first, second]);

        let coords = chain.resolve("Denver, CO").await.unwrap();
        assert_eq!(coords.longitude, -104.9903);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reports_last_error_when_all_fail() {
        let (only, _) = fixed(None);
        let chain = ChainGeocoder::new(vec![only]);

        let err = chain.resolve("Atlantis").await.unwrap_err();
        assert!(matches!(err, WeatherError::NoResults(ref l) if l == "Atlantis"));
    }

    #[test]
    fn search_hit_accepts_strings_and_numbers() {
        let hit: SearchHit =
            serde_json::from_value(serde_json::json!({ "lat": "41.6611", "lon": -91.5302 }))
                .unwrap();
        let c = hit.coordinates("test").unwrap();
        assert_eq!((c.latitude, c.longitude), (41.6611, -91.5302));
    }

    #[test]
    fn search_hit_rejects_garbage() {
        let hit: SearchHit =
            serde_json::from_value(serde_json::json!({ "lat": "north", "lon": "-91.5" }))
                .unwrap();
        assert!(matches!(hit.coordinates("test"), Err(WeatherError::Parse { .. })));
    }
}
