//! Rendering of classified telemetry for the terminal.

use anyhow::{Context, Result};
use shared::duration::format_duration;
use shared::models::{TelemetryBody, TelemetryItem};
use std::str::FromStr;

/// Output format for rendered telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Fixed-width columns: timestamp, type, duration, summary.
    #[default]
    Table,
    /// One JSON object per line: the decoded record augmented in place with
    /// its derived fields.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: '{other}'")),
        }
    }
}

/// Renders one item as a fixed-width table row.
#[must_use]
pub fn render_row(item: &TelemetryItem) -> String {
    let timestamp = item
        .timestamp()
        .map_or_else(|| "-".to_string(), |ts| ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string());
    let duration = item
        .duration()
        .map_or_else(|| "-".to_string(), format_duration);
    let type_display = match &item.telemetry().body {
        TelemetryBody::Activity(activity) => activity.type_display(),
        _ => item.telemetry().telemetry_type().to_string(),
    };
    let summary = summary(item).unwrap_or_default();
    format!("{timestamp:<23}  {type_display:<18}  {duration:>9}  {summary}")
}

/// The per-variant one-line summary.
fn summary(item: &TelemetryItem) -> Option<String> {
    match &item.telemetry().body {
        TelemetryBody::Activity(activity) => activity.detail(),
        TelemetryBody::Log(log) => log
            .display_message()
            .or_else(|| log.formatted_message.clone())
            .or_else(|| log.body.clone()),
        TelemetryBody::Metric(metric) => metric.detail(),
    }
}

/// Renders one item as the original decoded object augmented in place with
/// its derived fields.
///
/// # Errors
///
/// Fails when the stored JSON is not an object (it always is for decoded
/// items) or re-serialization fails.
pub fn render_json(item: &TelemetryItem) -> Result<String> {
    let mut record: serde_json::Value =
        serde_json::from_str(item.json()).context("re-parsing decoded telemetry")?;
    let object = record
        .as_object_mut()
        .context("telemetry JSON is not an object")?;

    let telemetry = item.telemetry();
    object.insert(
        "type".to_string(),
        serde_json::json!(telemetry.telemetry_type().to_string()),
    );
    if let TelemetryBody::Activity(activity) = &telemetry.body {
        object.insert(
            "typeDisplay".to_string(),
            serde_json::json!(activity.type_display()),
        );
    }
    if let Some(timestamp) = item.timestamp() {
        object.insert(
            "timestampDisplay".to_string(),
            serde_json::json!(timestamp.to_rfc3339()),
        );
    }
    if let Some(duration) = item.duration() {
        object.insert(
            "durationDisplay".to_string(),
            serde_json::json!(format_duration(duration)),
        );
    }
    if let Some(trace_ids) = telemetry.trace_ids() {
        object.insert("traceIds".to_string(), serde_json::json!(trace_ids));
    }
    if let Some(summary) = summary(item) {
        object.insert("summary".to_string(), serde_json::json!(summary));
    }
    if let Some(exception) = telemetry.exception() {
        object.insert("exception".to_string(), serde_json::json!(exception));
    }

    serde_json::to_string(&record).context("serializing augmented telemetry")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::decode::decode_line;

    #[test]
    fn test_render_row_for_log() {
        let item = decode_line(
            r#"{"log": {"formattedMessage": "disk low", "logLevel": "Warning",
                "timestamp": "2024-05-01T10:00:00Z"}}"#,
        )
        .unwrap();

        let row = render_row(&item);

        assert!(row.starts_with("2024-05-01 10:00:00.000"));
        assert!(row.contains("Message"));
        assert!(row.ends_with("[WRN] disk low"));
    }

    #[test]
    fn test_render_row_for_activity_with_duration() {
        let item = decode_line(
            r#"{"activity": {"kind": "Client", "displayName": "GET",
                "duration": "00:00:00.2000000",
                "tags": {"http.request.method": "GET"}}}"#,
        )
        .unwrap();

        let row = render_row(&item);

        assert!(row.contains("Dependency - HTTP"));
        assert!(row.contains("200.0 ms"));
    }

    #[test]
    fn test_render_row_placeholders_for_missing_fields() {
        let item = decode_line(r#"{"log": {"body": "plain"}}"#).unwrap();

        let row = render_row(&item);

        assert!(row.starts_with('-'));
        assert!(row.ends_with("plain"));
    }

    #[test]
    fn test_render_json_augments_in_place() {
        let item = decode_line(
            r#"{"activity": {"traceId": "abc", "kind": "Server", "displayName": "GET /api",
                "duration": "00:00:01", "tags": {"url.path": "/api"}}}"#,
        )
        .unwrap();

        let rendered = render_json(&item).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        // The original record is still present, not replaced.
        assert_eq!(value["activity"]["displayName"], "GET /api");
        assert_eq!(value["type"], "Request");
        assert_eq!(value["durationDisplay"], "1.0 s");
        assert_eq!(value["traceIds"]["Trace ID"], "abc");
        assert_eq!(value["summary"], "GET /api");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
