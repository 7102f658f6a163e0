use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::Config,
    error::Result,
    geocode::{ChainGeocoder, GeocodeMapsGeocoder, Geocoder, NominatimGeocoder},
    http::build_client,
    model::{Coordinates, Lookup, SunTimes, WeatherForecast},
    provider::{
        ForecastProvider, ProviderId, nws::NwsClient, open_meteo::OpenMeteoClient,
        sun::SunriseSunsetClient, tomorrow::TomorrowClient,
    },
    validate::{ForecastValidation, validate_forecast},
};

/// Tomorrow.io's hourly forecast horizon.
const TOMORROW_MAX_HOURS: i64 = 120;
/// Beyond this the NWS forecast runs out and historical averages are used.
const NWS_MAX_DAYS: i64 = 7;

/// Which source a target time should be answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tomorrow,
    Nws,
    Historical,
}

/// Pick a source by lead time. Past targets count as short lead times.
pub fn route(now: DateTime<Utc>, target: DateTime<Utc>, tomorrow_available: bool) -> Route {
    let lead = target - now;
    if lead.num_hours() <= TOMORROW_MAX_HOURS {
        if tomorrow_available {
            Route::Tomorrow
        } else {
            Route::Nws
        }
    } else if lead.num_days() <= NWS_MAX_DAYS {
        Route::Nws
    } else {
        Route::Historical
    }
}

/// Geocoding plus lead-time routing across the forecast sources.
#[derive(Debug)]
pub struct WeatherService {
    geocoder: ChainGeocoder,
    nws: NwsClient,
    tomorrow: Option<TomorrowClient>,
    historical: OpenMeteoClient,
    sun: SunriseSunsetClient,
}

impl WeatherService {
    pub fn new(config: &Config) -> Result<Self> {
        let http = build_client(&config.user_agent, config.timeout_secs)?;

        let mut geocoders: Vec<Box<dyn Geocoder>> = Vec::new();
        if let Some(key) = config.provider_api_key(ProviderId::GeocodeMaps) {
            geocoders.push(Box::new(GeocodeMapsGeocoder::new(
                &config.geocode_maps.base_url,
                key,
                http.clone(),
            )));
        } else {
            warn!("geocode.maps.co API key not configured, geocoding via Nominatim only");
        }
        geocoders.push(Box::new(NominatimGeocoder::new(
            &config.nominatim.base_url,
            Duration::from_millis(config.nominatim.rate_limit_delay_ms),
            http.clone(),
        )));

        let tomorrow = config
            .provider_api_key(ProviderId::Tomorrow)
            .map(|key| TomorrowClient::new(&config.tomorrow.base_url, key, http.clone()));

        let geocoder = ChainGeocoder::new(geocoders);
        debug!(geocoders = ?geocoder.names(), "geocoder chain ready");

        Ok(Self {
            geocoder,
            nws: NwsClient::new(&config.nws.base_url, http.clone()),
            tomorrow,
            historical: OpenMeteoClient::new(
                &config.open_meteo.historical_base_url,
                config.open_meteo.years_for_average,
                http.clone(),
            ),
            sun: SunriseSunsetClient::new(&config.sunrise_sunset.base_url, http),
        })
    }

    pub fn nws(&self) -> &NwsClient {
        &self.nws
    }

    pub async fn coordinates(&self, location: &str) -> Result<Coordinates> {
        self.geocoder.resolve(location).await
    }

    /// Forecast for `target`, choosing the source by how far it is from `now`.
    #[instrument(skip(self, coordinates, now), fields(%coordinates))]
    pub async fn forecast(
        &self,
        coordinates: Coordinates,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<WeatherForecast> {
        let route = route(now, target, self.tomorrow.is_some());
        let hours = (target - now).num_hours();

        match (route, &self.tomorrow) {
            (Route::Tomorrow, Some(tomorrow)) => {
                info!(hours, source = %tomorrow.source(), "forecast source selected");
                match tomorrow.forecast(coordinates, target).await {
                    Ok(forecast) => Ok(forecast),
                    Err(e) => {
                        warn!(
                            error = %e,
                            fallback = %self.nws.source(),
                            "Tomorrow.io forecast failed, falling back"
                        );
                        self.nws.forecast(coordinates, target).await
                    }
                }
            }
            (Route::Tomorrow | Route::Nws, _) => {
                info!(hours, source = %self.nws.source(), "forecast source selected");
                self.nws.forecast(coordinates, target).await
            }
            (Route::Historical, _) => {
                info!(
                    days = (target - now).num_days(),
                    source = %self.historical.source(),
                    "forecast source selected"
                );
                self.historical.forecast_at(coordinates, target, now).await
            }
        }
    }

    /// Geocode `location` and forecast it at `target`.
    pub async fn lookup(
        &self,
        location: &str,
        target: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Lookup> {
        let coordinates = self.coordinates(location).await?;
        let forecast = self.forecast(coordinates, target, now).await?;

        Ok(Lookup {
            location: location.to_string(),
            coordinates,
            target,
            forecast,
        })
    }

    /// Fetch a forecast document and check the shape of its fields.
    pub async fn validate(&self, forecast_url: &str, now: DateTime<Utc>) -> Result<ForecastValidation> {
        let doc = self.nws.raw_forecast(forecast_url).await?;
        validate_forecast(&doc, now)
    }

    pub async fn sun_times(&self, coordinates: Coordinates, date: NaiveDate) -> Result<SunTimes> {
        self.sun.times(coordinates, date).await
    }
}
