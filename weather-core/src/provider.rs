use crate::model::FetchOutcome;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current-weather payloads.
///
/// Implementations report every failure through [`FetchOutcome::Failure`]
/// and hold no shared mutable state, so one provider can serve many
/// concurrent fetches.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, location: &str) -> FetchOutcome;
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
