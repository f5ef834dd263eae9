use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `strftime` layout of batch timestamps, e.g. `19-Oct-2026 09:41:07 AM`.
pub const TIMESTAMP_FORMAT: &str = "%d-%b-%Y %I:%M:%S %p";

/// Placeholder for a field missing from a successful payload.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder for every weather field of a failed location.
pub const NO_VALUE: &str = "-";

/// Result of querying the weather service for one location.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Parsed JSON body of a successful response.
    Success(Value),
    /// `status` is `None` when the request never produced a response.
    Failure { status: Option<u16>, message: String },
}

impl FetchOutcome {
    pub fn failure(status: Option<u16>, message: impl Into<String>) -> Self {
        FetchOutcome::Failure { status, message: message.into() }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failure { .. })
    }
}

/// Fields picked out of a current-weather payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSummary {
    pub name: String,
    pub temp: String,
    pub humidity: String,
    pub description: String,
    pub country: String,
}

impl WeatherSummary {
    /// Every lookup falls back to `"N/A"`; a payload of any shape is accepted.
    pub fn from_payload(payload: &Value) -> Self {
        let field = |pointer: &str| {
            payload
                .pointer(pointer)
                .filter(|v| !v.is_null())
                .map(display_value)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            name: field("/name"),
            temp: field("/main/temp"),
            humidity: field("/main/humidity"),
            description: field("/weather/0/description"),
            country: field("/sys/country"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Ok => "OK",
            RecordStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a batch, for display and for the persisted log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub city: String,
    pub temp: String,
    pub humidity: String,
    pub description: String,
    pub country: String,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReportRecord {
    pub fn success(summary: &WeatherSummary) -> Self {
        Self {
            city: summary.name.clone(),
            temp: format!("{} °C", summary.temp),
            humidity: format!("{} %", summary.humidity),
            description: summary.description.clone(),
            country: summary.country.clone(),
            status: RecordStatus::Ok,
            message: None,
        }
    }

    /// Uses the requested location, since the service resolved nothing.
    pub fn failure(location: &str) -> Self {
        Self {
            city: location.to_string(),
            temp: NO_VALUE.to_string(),
            humidity: NO_VALUE.to_string(),
            description: NO_VALUE.to_string(),
            country: NO_VALUE.to_string(),
            status: RecordStatus::Error,
            message: Some(format!("{location} not found")),
        }
    }

    pub fn from_outcome(location: &str, outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Success(payload) => Self::success(&WeatherSummary::from_payload(payload)),
            FetchOutcome::Failure { .. } => Self::failure(location),
        }
    }
}

/// All records of one run, tagged with the time the run started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub timestamp: String,
    pub results: Vec<ReportRecord>,
}

/// Local wall-clock time in [`TIMESTAMP_FORMAT`].
pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Strings render without quotes, everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use serde_json::json;

    #[test]
    fn success_record_formats_units() {
        let payload = json!({
            "name": "Delhi",
            "main": {"temp": 30, "humidity": 40},
            "weather": [{"description": "clear sky"}],
            "sys": {"country": "IN"}
        });

        let record = ReportRecord::from_outcome("Delhi", &FetchOutcome::Success(payload));

        assert_eq!(
            record,
            ReportRecord {
                city: "Delhi".into(),
                temp: "30 °C".into(),
                humidity: "40 %".into(),
                description: "clear sky".into(),
                country: "IN".into(),
                status: RecordStatus::Ok,
                message: None,
            }
        );
    }

    #[test]
    fn fractional_temperature_is_kept() {
        let summary = WeatherSummary::from_payload(&json!({"main": {"temp": 21.57}}));
        assert_eq!(summary.temp, "21.57");
    }

    #[test]
    fn missing_fields_fall_back_to_not_available() {
        let summary = WeatherSummary::from_payload(&json!({"weather": []}));

        assert_eq!(summary.name, "N/A");
        assert_eq!(summary.temp, "N/A");
        assert_eq!(summary.humidity, "N/A");
        assert_eq!(summary.description, "N/A");
        assert_eq!(summary.country, "N/A");

        let record = ReportRecord::success(&summary);
        assert_eq!(record.temp, "N/A °C");
        assert_eq!(record.humidity, "N/A %");
    }

    #[test]
    fn non_object_payload_does_not_panic() {
        let summary = WeatherSummary::from_payload(&json!([1, 2, 3]));
        assert_eq!(summary.name, "N/A");
    }

    #[test]
    fn failure_record_uses_requested_location() {
        let outcome = FetchOutcome::failure(Some(404), "city not found");
        let record = ReportRecord::from_outcome("Nowhereistan", &outcome);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "city": "Nowhereistan",
                "temp": "-",
                "humidity": "-",
                "description": "-",
                "country": "-",
                "status": "ERROR",
                "message": "Nowhereistan not found"
            })
        );
    }

    #[test]
    fn network_failure_matches_http_failure_shape() {
        let network = FetchOutcome::failure(None, "error sending request: connection refused");
        let http = FetchOutcome::failure(Some(404), "city not found");

        assert_eq!(
            ReportRecord::from_outcome("Punjab", &network),
            ReportRecord::from_outcome("Punjab", &http)
        );
        assert_eq!(
            ReportRecord::from_outcome("Punjab", &network).message.as_deref(),
            Some("Punjab not found")
        );
    }

    #[test]
    fn success_record_serializes_without_message_key() {
        let record = ReportRecord::success(&WeatherSummary::from_payload(&json!({"name": "Jammu"})));
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("message").is_none());
        assert_eq!(value["status"], "OK");
    }

    #[test]
    fn timestamp_matches_layout() {
        let ts = timestamp_now();
        assert!(NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok(), "{ts}");
        assert!(ts.ends_with("AM") || ts.ends_with("PM"));
    }
}
