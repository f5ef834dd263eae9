//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - Abstraction over the weather provider, with an OpenWeather client
//! - Concurrent dispatch of one fetch per location
//! - Shared domain models (outcomes, report records, batches)
//! - The append-only JSON batch log
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod batch_log;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod provider;

pub use batch_log::{BatchLog, LogError};
pub use config::Config;
pub use dispatch::{DispatchOptions, collect_batch, dispatch};
pub use model::{BatchEntry, FetchOutcome, RecordStatus, ReportRecord, WeatherSummary};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
