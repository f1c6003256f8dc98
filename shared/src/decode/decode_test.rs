//! Tests for telemetry decoding.

#[cfg(test)]
mod tests {
    use crate::decode::{decode_json, decode_line};
    use crate::models::TelemetryType;
    use chrono::Duration;

    const ACTIVITY_LINE: &str = concat!(
        r#"{"activity": {"#,
        r#""traceId": "0af7651916cd43dd8448eb211c80319c", "#,
        r#""spanId": "b7ad6b7169203331", "#,
        r#""displayName": "GET /api/users", "#,
        r#""kind": "Server", "#,
        r#""startTime": "2024-05-01T10:00:00.1234567Z", "#,
        r#""duration": "00:00:00.0421337", "#,
        r#""tags": {"url.path": "/api/users", "url.query": "page=2"}}, "#,
        r#""resource": {"service.name": "api"}}"#
    );

    #[test]
    fn test_decode_json_activity() {
        let item = decode_json(ACTIVITY_LINE).unwrap();
        let activity = item.telemetry().activity().unwrap();

        assert_eq!(activity.telemetry_type(), TelemetryType::Request);
        assert_eq!(activity.request_path(), Some("/api/users?page=2".to_string()));
        assert_eq!(item.duration(), Some(Duration::nanoseconds(42_133_700)));
        assert_eq!(item.json(), ACTIVITY_LINE);
    }

    #[test]
    fn test_decode_line_skips_logger_prefix() {
        let line = format!("MyApp.exe Information: 0 : {ACTIVITY_LINE}");
        let item = decode_line(&line).unwrap();

        assert_eq!(item.telemetry().telemetry_type(), TelemetryType::Request);
        assert_eq!(item.json(), ACTIVITY_LINE);
    }

    #[test]
    fn test_decode_line_rejects_plain_text() {
        assert!(decode_line("Application started.").is_none());
        assert!(decode_line("").is_none());
    }

    #[test]
    fn test_decode_line_rejects_non_telemetry_json() {
        assert!(decode_line(r#"{"message": "not telemetry"}"#).is_none());
    }

    #[test]
    fn test_decode_json_fails_on_malformed_duration() {
        let json = r#"{"activity": {"duration": "1:02"}}"#;
        assert!(decode_json(json).is_err());
    }

    #[test]
    fn test_decode_json_fails_on_empty_record() {
        assert!(decode_json(r#"{"resource": {"service.name": "api"}}"#).is_err());
    }

    #[test]
    fn test_decode_log_record() {
        let json = r#"{"log": {"formattedMessage": "disk low", "logLevel": "Warning"}}"#;
        let item = decode_json(json).unwrap();

        assert_eq!(item.telemetry().telemetry_type(), TelemetryType::Message);
        assert_eq!(
            item.telemetry().log().unwrap().display_message(),
            Some("[WRN] disk low".to_string())
        );
    }

    #[test]
    fn test_decode_metric_record() {
        let json = r#"{"metric": {"name": "requests", "meterName": "MyCompany.Meters",
            "points": [{"longSum": 7, "tags": {"status": "ok"}}]}}"#;
        let item = decode_json(json).unwrap();

        let metric = item.telemetry().metric().unwrap();
        assert_eq!(metric.detail(), Some("requests - MyCompany.Meters".to_string()));
        assert_eq!(metric.tagged_points().len(), 1);
    }
}
