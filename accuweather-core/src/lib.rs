//! Core library for the `accuweather` CLI.
//!
//! This crate defines:
//! - The endpoint registry and a typed connection to the AccuWeather REST API
//! - Unit-carrying measurement values (temperature, precipitation, wind, ...)
//! - Domain objects mapped from the JSON payloads (locations, forecasts, observations)
//! - Configuration & credentials handling
//!
//! It is used by `accuweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod request;
pub mod transport;
pub mod units;

pub use config::Config;
pub use connection::{Connection, ConnectionConfig};
pub use endpoint::{ApiVariant, EndpointParams, Operation, froot};
pub use error::{AccuweatherError, Result};
pub use model::{
    AirQuality, CurrentObs, DailyForecasts, Forecast, HourlyForecasts, Location, LocationSet,
};
pub use request::{
    AirQualityPeriod, AlertHorizon, ClimoKind, ClimoPeriod, ForecastHorizon, LocationTarget,
    ObservationHorizon,
};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
