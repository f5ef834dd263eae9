//! Concurrent fan-out of weather fetches.
//!
//! One fetch per location runs through a bounded pool. Each fetch has its
//! own timeout and the batch as a whole has a deadline, after which the
//! fetches still in flight are dropped. Records come back in completion
//! order, one per requested location.

use std::time::Duration;

use futures::{StreamExt, stream};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

use crate::{
    model::{BatchEntry, FetchOutcome, ReportRecord, timestamp_now},
    provider::WeatherProvider,
};

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BATCH_DEADLINE: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Maximum number of fetches in flight.
    pub workers: usize,
    pub request_timeout: Duration,
    pub batch_deadline: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            batch_deadline: DEFAULT_BATCH_DEADLINE,
        }
    }
}

/// Fetch every location and fold each outcome into a [`ReportRecord`].
///
/// `on_complete` sees each location and its raw outcome as soon as it
/// finishes, before the record is built.
pub async fn dispatch<F>(
    provider: &dyn WeatherProvider,
    locations: &[String],
    options: &DispatchOptions,
    mut on_complete: F,
) -> Vec<ReportRecord>
where
    F: FnMut(&str, &FetchOutcome),
{
    let request_timeout = options.request_timeout;
    let deadline = Instant::now() + options.batch_deadline;

    let mut pending = stream::iter(locations.iter().enumerate())
        .map(|(idx, location)| async move {
            let outcome = match timeout(request_timeout, provider.fetch(location)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(location = location.as_str(), "request timed out");
                    FetchOutcome::failure(
                        None,
                        format!("request timed out after {}s", request_timeout.as_secs()),
                    )
                }
            };
            (idx, outcome)
        })
        .buffer_unordered(options.workers.max(1));

    let mut completed = vec![false; locations.len()];
    let mut records = Vec::with_capacity(locations.len());

    loop {
        match timeout_at(deadline, pending.next()).await {
            Ok(Some((idx, outcome))) => {
                let location = &locations[idx];
                debug!(location = location.as_str(), failed = outcome.is_failure(), "fetch completed");
                completed[idx] = true;
                on_complete(location, &outcome);
                records.push(ReportRecord::from_outcome(location, &outcome));
            }
            Ok(None) => break,
            Err(_) => {
                let unfinished = completed.iter().filter(|done| !**done).count();
                warn!(unfinished, "batch deadline exceeded, abandoning remaining fetches");

                let outcome = FetchOutcome::failure(None, "batch deadline exceeded");
                for (location, _) in locations.iter().zip(&completed).filter(|(_, done)| !**done) {
                    on_complete(location, &outcome);
                    records.push(ReportRecord::failure(location));
                }
                break;
            }
        }
    }

    records
}

/// Stamp a new batch with the current time, then dispatch it.
pub async fn collect_batch<F>(
    provider: &dyn WeatherProvider,
    locations: &[String],
    options: &DispatchOptions,
    on_complete: F,
) -> BatchEntry
where
    F: FnMut(&str, &FetchOutcome),
{
    let timestamp = timestamp_now();
    let results = dispatch(provider, locations, options, on_complete).await;
    BatchEntry { timestamp, results }
}
