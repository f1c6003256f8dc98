//! Activity (trace span) data model and classification.
//!
//! An [`Activity`] is one timed unit of work in a distributed trace, decoded
//! from the traced process's output. Every derived field on it is a pure
//! function of the stored record, recomputed on access: classification never
//! mutates the record and tolerates partial data by returning `None`.

use crate::duration::format_duration;
use crate::models::attributes::AttributeMap;
use crate::models::telemetry::TelemetryType;
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use validator::Validate;

/// Status code reported for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActivityStatusCode {
    /// No status was set.
    #[default]
    Unset,
    /// The activity completed successfully.
    Ok,
    /// The activity completed with an error.
    Error,
}

/// Kind of activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ActivityKind {
    /// Default kind (internal operation).
    #[default]
    Internal,
    /// The activity handles an inbound request.
    Server,
    /// The activity makes an outbound call.
    Client,
    /// The activity produces a message.
    Producer,
    /// The activity consumes a message.
    Consumer,
}

/// Dependency sub-type, determined from the activity tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// The activity is an outbound HTTP request.
    #[serde(rename = "HTTP")]
    Http,
    /// The activity is a database query.
    #[serde(rename = "SQL")]
    Sql,
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "HTTP"),
            Self::Sql => write!(f, "SQL"),
        }
    }
}

/// The source that produced an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySource {
    /// Source name.
    pub name: String,
    /// Source version, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ActivitySource {
    /// The source name folded to lowercase, independent of process locale.
    #[must_use]
    pub fn name_lower(&self) -> String {
        self.name.to_lowercase()
    }
}

/// An event recorded within an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Event name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Timestamp when the event occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Event attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<AttributeMap>,
}

/// An exception extracted from an activity's events.
///
/// Built only when an event named `"exception"` carries all three of
/// `exception.message`, `exception.stacktrace`, and `exception.type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityException {
    /// Timestamp of the exception event.
    pub timestamp: DateTime<Utc>,
    /// Exception message.
    pub message: String,
    /// Full stack trace.
    pub stacktrace: String,
    /// Exception type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ActivityException {
    /// The display form of the exception (its stack trace).
    #[must_use]
    pub fn display(&self) -> &str {
        &self.stacktrace
    }
}

/// A decoded trace span.
///
/// # Example
///
/// ```
/// use shared::models::{Activity, ActivityKind, AttributeMap, DependencyType, TelemetryType};
///
/// let activity = Activity {
///     kind: Some(ActivityKind::Client),
///     tags: Some(AttributeMap::new().with("http.request.method", "GET")),
///     ..Activity::default()
/// };
///
/// assert_eq!(activity.telemetry_type(), TelemetryType::Dependency);
/// assert_eq!(activity.dependency_type(), Some(DependencyType::Http));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct Activity {
    /// Root identifier of the whole operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,

    /// Trace identifier.
    #[validate(length(min = 1, message = "Trace ID cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Span identifier.
    #[validate(length(min = 1, message = "Span ID cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,

    /// Parent span identifier (absent for root spans).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,

    /// Trace flags, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_trace_flags: Option<String>,

    /// W3C tracestate header value, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_state_string: Option<String>,

    /// The source that produced the activity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ActivitySource>,

    /// Display name of the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Activity kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ActivityKind>,

    /// Timestamp when the activity started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// Elapsed time, TimeSpan-encoded on the wire.
    #[serde(
        with = "crate::duration::timespan::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,

    /// Activity tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<AttributeMap>,

    /// Operation name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    /// Status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatusCode>,

    /// Status description, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,

    /// Events recorded during the activity, in original order.
    pub events: Vec<ActivityEvent>,
}

/// Errors that can occur during activity validation.
#[derive(Debug, Error)]
pub enum ActivityValidationError {
    /// The trace ID is present but empty.
    #[error("Trace ID cannot be empty")]
    EmptyTraceId,

    /// The span ID is present but empty.
    #[error("Span ID cannot be empty")]
    EmptySpanId,

    /// The reported duration is negative.
    #[error("Activity duration cannot be negative")]
    NegativeDuration,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Activity {
    fn tag(&self, key: &str) -> Option<String> {
        self.tags.as_ref()?.get_string(key)
    }

    fn has_tag(&self, key: &str) -> bool {
        self.tags.as_ref().is_some_and(|tags| tags.contains_key(key))
    }

    /// The telemetry type of the activity.
    ///
    /// Exception detection takes precedence over all other classification.
    #[must_use]
    pub fn telemetry_type(&self) -> TelemetryType {
        if self.exception().is_some() {
            TelemetryType::Exception
        } else if self.kind == Some(ActivityKind::Server) && self.has_tag("url.path") {
            TelemetryType::Request
        } else if self.kind == Some(ActivityKind::Client) {
            TelemetryType::Dependency
        } else {
            TelemetryType::Activity
        }
    }

    /// The dependency sub-type (HTTP or SQL), meaningful only for client
    /// activities.
    #[must_use]
    pub fn dependency_type(&self) -> Option<DependencyType> {
        if self.kind != Some(ActivityKind::Client) {
            return None;
        }
        if self.has_tag("http.request.method") {
            Some(DependencyType::Http)
        } else if self.has_tag("db.system") {
            Some(DependencyType::Sql)
        } else {
            None
        }
    }

    /// True if the activity reports an error through any of its channels.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == Some(ActivityStatusCode::Error)
            || self.has_tag("error.type")
            || self.tag("otel.status_code").as_deref() == Some("ERROR")
    }

    /// The exception extracted from the activity's events.
    ///
    /// Scans events in original order for the first event named
    /// `"exception"` that carries a timestamp and all three exception tags;
    /// partially tagged events are skipped.
    #[must_use]
    pub fn exception(&self) -> Option<ActivityException> {
        for event in &self.events {
            if event.name.as_deref() != Some("exception") {
                continue;
            }
            let (Some(tags), Some(timestamp)) = (event.tags.as_ref(), event.timestamp) else {
                continue;
            };
            let values = tags.primitive_values();
            if let (Some(message), Some(stacktrace), Some(type_name)) = (
                values.get("exception.message"),
                values.get("exception.stacktrace"),
                values.get("exception.type"),
            ) {
                return Some(ActivityException {
                    timestamp,
                    message: message.clone(),
                    stacktrace: stacktrace.clone(),
                    type_name: type_name.clone(),
                });
            }
        }
        None
    }

    /// The error display string: the first available of exception message
    /// (newlines flattened), `otel.status_description`, `otel.status_code`,
    /// `db.response.status_code`, `error.type`.
    #[must_use]
    pub fn error_display(&self) -> Option<String> {
        self.exception()
            .map(|exception| exception.message.replace('\n', " "))
            .or_else(|| self.tag("otel.status_description"))
            .or_else(|| self.tag("otel.status_code"))
            .or_else(|| self.tag("db.response.status_code"))
            .or_else(|| self.tag("error.type"))
    }

    /// The display string for the activity type, including the dependency
    /// sub-type when present.
    #[must_use]
    pub fn type_display(&self) -> String {
        match self.dependency_type() {
            Some(dependency) => format!("{} - {}", self.telemetry_type(), dependency),
            None => self.telemetry_type().to_string(),
        }
    }

    /// The request path for server-side activities (`url.path` plus
    /// `?url.query` when present).
    #[must_use]
    pub fn request_path(&self) -> Option<String> {
        let tags = self.tags.as_ref()?;
        let mut path = tags.get_string_or("url.path", "");
        if tags.contains_key("url.query") {
            path.push('?');
            path.push_str(&tags.get_string_or("url.query", ""));
        }
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }

    /// The URL path for client-side HTTP activities.
    ///
    /// Parses the `url.full` tag and returns its path and query; a value
    /// that fails to parse is returned unchanged rather than dropped.
    #[must_use]
    pub fn url_path(&self) -> Option<String> {
        let value = self.tag("url.full")?;
        match Url::parse(&value) {
            Ok(url) => match url.query() {
                Some(query) => Some(format!("{}{query}", url.path())),
                None => Some(url.path().to_string()),
            },
            Err(_) => Some(value),
        }
    }

    /// The database query text (`db.query.text`, falling back to the older
    /// `db.statement`).
    #[must_use]
    pub fn db_query(&self) -> Option<String> {
        self.tag("db.query.text").or_else(|| self.tag("db.statement"))
    }

    /// The database name.
    #[must_use]
    pub fn db_name(&self) -> Option<String> {
        self.tag("db.name")
    }

    /// The HTTP response status code.
    #[must_use]
    pub fn response_status_code(&self) -> Option<String> {
        self.tag("http.response.status_code")
    }

    /// The trace-correlation identifiers under their display labels, in a
    /// fixed insertion order.
    #[must_use]
    pub fn trace_ids(&self) -> IndexMap<&'static str, String> {
        let mut ids = IndexMap::new();
        if let Some(root_id) = &self.root_id {
            ids.insert("Root ID", root_id.clone());
        }
        if let Some(trace_id) = &self.trace_id {
            ids.insert("Trace ID", trace_id.clone());
        }
        if let Some(span_id) = &self.span_id {
            ids.insert("Span ID", span_id.clone());
        }
        if let Some(parent_span_id) = &self.parent_span_id {
            ids.insert("Parent Span ID", parent_span_id.clone());
        }
        if let Some(flags) = &self.activity_trace_flags {
            ids.insert("Flags", flags.clone());
        }
        ids
    }

    /// Time between the activity start and the first
    /// `"received-first-response"` event (time spent querying the database).
    #[must_use]
    pub fn db_query_time(&self) -> Option<Duration> {
        let start = self.start_time?;
        self.events
            .iter()
            .find(|event| {
                event.name.as_deref() == Some("received-first-response")
                    && event.timestamp.is_some()
            })
            .and_then(|event| event.timestamp)
            .map(|timestamp| timestamp - start)
    }

    /// Time between the first response and the end of the activity (time
    /// spent reading from the database).
    #[must_use]
    pub fn db_read_time(&self) -> Option<Duration> {
        Some(self.duration? - self.db_query_time()?)
    }

    /// A one-line human summary of the activity.
    ///
    /// Joins the available parts in a fixed order with `" - "`, flattens
    /// newlines, and truncates to 100 characters with a trailing ellipsis.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(dependency) = self.dependency_type() {
            parts.push(dependency.to_string());
        }
        // Show the source only for plain activities (not requests or
        // dependencies).
        if let Some(source) = &self.source {
            if self.telemetry_type() == TelemetryType::Activity {
                parts.push(source.name.clone());
            }
        }
        if let Some(name) = self.display_name.as_deref().filter(|name| !name.is_empty()) {
            // The SQL client reports the database name as the display name,
            // which duplicates the db.name tag.
            if self.db_name().as_deref() != Some(name) {
                parts.push(name.to_string());
            }
            // A request that did not match a route has a bare method as its
            // display name; add the request path for those.
            if self.telemetry_type() == TelemetryType::Request && !name.contains(' ') {
                if let Some(path) = self.request_path() {
                    parts.push(path);
                }
            }
        }
        if let Some(code) = self.response_status_code() {
            parts.push(code);
        }
        if self.is_error() {
            if let Some(description) = &self.status_description {
                parts.push(description.clone());
            }
            if let Some(error) = self.error_display() {
                parts.push(error);
            }
        }
        if let Some(query) = self.db_query() {
            parts.push(query);
        }
        if let Some(path) = self.url_path() {
            parts.push(path);
        }
        if parts.is_empty() {
            return None;
        }
        let joined = parts.join(" - ").replace('\r', "").replace('\n', " ");
        Some(truncate_with_ellipsis(&joined, 100))
    }

    /// The activity duration rendered for display.
    #[must_use]
    pub fn duration_display(&self) -> Option<String> {
        self.duration.map(format_duration)
    }

    /// Validates the activity.
    ///
    /// Classification never requires validation; this is an opt-in
    /// structural check for strict decode paths.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The trace ID or span ID is present but empty
    /// - The duration is negative
    pub fn validate_record(&self) -> Result<(), ActivityValidationError> {
        if matches!(&self.trace_id, Some(id) if id.is_empty()) {
            return Err(ActivityValidationError::EmptyTraceId);
        }
        if matches!(&self.span_id, Some(id) if id.is_empty()) {
            return Err(ActivityValidationError::EmptySpanId);
        }
        if matches!(self.duration, Some(duration) if duration < Duration::zero()) {
            return Err(ActivityValidationError::NegativeDuration);
        }
        self.validate()?;
        Ok(())
    }
}

fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}
