//! Core library for the `windchill` CLI.
//!
//! This crate defines:
//! - The wind chill formula and cold severity bands
//! - Domain models (forecast samples, wind chill results, cities)
//! - Abstraction over keyless forecast providers (Open-Meteo, MET Norway)
//! - Cross-city views: leaderboard and extreme cold alerts
//! - Configuration handling
//!
//! It is used by `windchill-cli`, but can also be reused by other binaries or services.

pub mod chill;
pub mod city;
pub mod config;
pub mod dashboard;
pub mod model;
pub mod provider;

pub use chill::{ColdSeverity, WindChillError, try_wind_chill, wind_chill};
pub use city::City;
pub use config::Config;
pub use dashboard::{ColdAlert, Leaderboard, LeaderboardRow, Snapshot};
pub use model::{CityForecast, ForecastRequest, ForecastSample, WindChillResult};
pub use provider::{ForecastProvider, ProviderId};
