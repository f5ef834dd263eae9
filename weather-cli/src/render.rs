use std::fmt::Write;

use weather_core::{BatchEntry, FetchOutcome, WeatherSummary};

const RULE_WIDTH: usize = 90;

/// Status line printed as soon as a location's fetch completes.
pub fn progress_line(location: &str, outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Failure { message, .. } => {
            format!("Error for {location}: {}", capitalize(message))
        }
        FetchOutcome::Success(payload) => {
            let s = WeatherSummary::from_payload(payload);
            format!("{} : {}°C, {}%, {}, {}", s.name, s.temp, s.humidity, s.description, s.country)
        }
    }
}

/// Timestamp line, header, rule and one row per record, in record order.
pub fn table(batch: &BatchEntry) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\nTimestamp: {}", batch.timestamp);
    let _ = writeln!(
        out,
        "{:<20} {:<12} {:<10} {:<20} {:<8} {:<8}",
        "CITY", "Temperature", "Humidity", "Description", "Country", "Status"
    );
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    for r in &batch.results {
        let _ = writeln!(
            out,
            "{:<20} {:<12} {:<10} {:<20} {:<8} {:<8}",
            r.city, r.temp, r.humidity, r.description, r.country, r.status.as_str()
        );
    }

    out
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
