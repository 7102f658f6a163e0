//! Core library for the `gameday-weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Geocoding (hardcoded venues, geocode.maps.co, Nominatim)
//! - Forecast sources (NWS, Tomorrow.io, Open-Meteo historical averages)
//! - Forecast-period selection and field validation
//!
//! `WeatherService` ties these together and is what the CLI drives.

pub mod config;
pub mod error;
pub mod geocode;
pub mod http;
pub mod model;
pub mod period;
pub mod provider;
pub mod service;
pub mod units;
pub mod validate;

pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use model::{Coordinates, ForecastPeriod, ForecastSource, Lookup, SunTimes, WeatherForecast};
pub use provider::{ForecastProvider, ProviderId};
pub use service::WeatherService;
