//! The unified telemetry facade.
//!
//! A [`Telemetry`] wraps exactly one of the three record kinds behind a
//! closed variant type, so "none present" and "several present" states are
//! unrepresentable after construction. The wire shape carries three optional
//! fields; construction rejects empty records and resolves multi-variant
//! records with the fixed precedence activity > log > metric.

use crate::models::activity::{Activity, ActivityValidationError};
use crate::models::attributes::AttributeMap;
use crate::models::log::{LogRecord, LogValidationError};
use crate::models::metric::{Metric, MetricValidationError};
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Coarse classification used for display grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TelemetryType {
    /// A generic activity (span).
    Activity,
    /// A server-side request.
    Request,
    /// An outbound dependency call (HTTP or SQL).
    Dependency,
    /// A metric sample.
    Metric,
    /// A log message.
    Message,
    /// A log message or activity carrying an exception.
    Exception,
}

impl std::fmt::Display for TelemetryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activity => write!(f, "Activity"),
            Self::Request => write!(f, "Request"),
            Self::Dependency => write!(f, "Dependency"),
            Self::Metric => write!(f, "Metric"),
            Self::Message => write!(f, "Message"),
            Self::Exception => write!(f, "Exception"),
        }
    }
}

/// Error returned when parsing an unknown telemetry type name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown telemetry type: '{0}'")]
pub struct ParseTelemetryTypeError(String);

impl FromStr for TelemetryType {
    type Err = ParseTelemetryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activity" => Ok(Self::Activity),
            "request" => Ok(Self::Request),
            "dependency" => Ok(Self::Dependency),
            "metric" => Ok(Self::Metric),
            "message" => Ok(Self::Message),
            "exception" => Ok(Self::Exception),
            _ => Err(ParseTelemetryTypeError(s.to_string())),
        }
    }
}

/// The record carried by a [`Telemetry`].
#[derive(Debug, Clone)]
pub enum TelemetryBody {
    /// A trace span.
    Activity(Activity),
    /// A log record.
    Log(LogRecord),
    /// A metric sample.
    Metric(Metric),
}

/// Error returned when a decoded record carries none of the three variants.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("telemetry record contains no activity, log, or metric")]
pub struct EmptyTelemetry;

/// One decoded telemetry record plus the resource that emitted it.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawTelemetry")]
pub struct Telemetry {
    /// The wrapped record.
    pub body: TelemetryBody,
    /// Attributes of the emitting process.
    pub resource: Option<AttributeMap>,
}

/// The wire shape of a telemetry record: three optional fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTelemetry {
    activity: Option<Activity>,
    metric: Option<Metric>,
    log: Option<LogRecord>,
    resource: Option<AttributeMap>,
}

impl TryFrom<RawTelemetry> for Telemetry {
    type Error = EmptyTelemetry;

    fn try_from(raw: RawTelemetry) -> Result<Self, Self::Error> {
        let body = if let Some(activity) = raw.activity {
            TelemetryBody::Activity(activity)
        } else if let Some(log) = raw.log {
            TelemetryBody::Log(log)
        } else if let Some(metric) = raw.metric {
            TelemetryBody::Metric(metric)
        } else {
            return Err(EmptyTelemetry);
        };
        Ok(Self {
            body,
            resource: raw.resource,
        })
    }
}

impl Serialize for Telemetry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            activity: Option<&'a Activity>,
            #[serde(skip_serializing_if = "Option::is_none")]
            metric: Option<&'a Metric>,
            #[serde(skip_serializing_if = "Option::is_none")]
            log: Option<&'a LogRecord>,
            #[serde(skip_serializing_if = "Option::is_none")]
            resource: Option<&'a AttributeMap>,
        }

        Wire {
            activity: self.activity(),
            metric: self.metric(),
            log: self.log(),
            resource: self.resource.as_ref(),
        }
        .serialize(serializer)
    }
}

/// Errors that can occur during telemetry validation.
#[derive(Debug, Error)]
pub enum TelemetryValidationError {
    /// The wrapped activity failed validation.
    #[error(transparent)]
    Activity(#[from] ActivityValidationError),

    /// The wrapped log record failed validation.
    #[error(transparent)]
    Log(#[from] LogValidationError),

    /// The wrapped metric failed validation.
    #[error(transparent)]
    Metric(#[from] MetricValidationError),
}

impl Telemetry {
    /// Creates a telemetry record from a body and optional resource.
    #[must_use]
    pub fn new(body: TelemetryBody, resource: Option<AttributeMap>) -> Self {
        Self { body, resource }
    }

    /// The wrapped activity, if this record is one.
    #[must_use]
    pub fn activity(&self) -> Option<&Activity> {
        match &self.body {
            TelemetryBody::Activity(activity) => Some(activity),
            _ => None,
        }
    }

    /// The wrapped log record, if this record is one.
    #[must_use]
    pub fn log(&self) -> Option<&LogRecord> {
        match &self.body {
            TelemetryBody::Log(log) => Some(log),
            _ => None,
        }
    }

    /// The wrapped metric, if this record is one.
    #[must_use]
    pub fn metric(&self) -> Option<&Metric> {
        match &self.body {
            TelemetryBody::Metric(metric) => Some(metric),
            _ => None,
        }
    }

    /// The telemetry type derived from the wrapped record.
    #[must_use]
    pub fn telemetry_type(&self) -> TelemetryType {
        match &self.body {
            TelemetryBody::Activity(activity) => activity.telemetry_type(),
            TelemetryBody::Log(log) => log.telemetry_type(),
            TelemetryBody::Metric(metric) => metric.telemetry_type(),
        }
    }

    /// The record timestamp: activity start time, log timestamp, or metric
    /// representative timestamp.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match &self.body {
            TelemetryBody::Activity(activity) => activity.start_time,
            TelemetryBody::Log(log) => log.timestamp,
            TelemetryBody::Metric(metric) => metric.timestamp(),
        }
    }

    /// The trace-correlation identifiers: the activity's, else the log's.
    #[must_use]
    pub fn trace_ids(&self) -> Option<IndexMap<&'static str, String>> {
        match &self.body {
            TelemetryBody::Activity(activity) => Some(activity.trace_ids()),
            TelemetryBody::Log(log) => log.trace_ids(),
            TelemetryBody::Metric(_) => None,
        }
    }

    /// The database query, for SQL activities.
    #[must_use]
    pub fn sql(&self) -> Option<String> {
        self.activity()?.db_query()
    }

    /// The formatted exception text, when available.
    #[must_use]
    pub fn exception(&self) -> Option<String> {
        match &self.body {
            TelemetryBody::Activity(activity) => {
                activity.exception().map(|exception| exception.stacktrace)
            }
            TelemetryBody::Log(log) => log.exception.as_ref()?.display.clone(),
            TelemetryBody::Metric(_) => None,
        }
    }

    /// Validates the wrapped record.
    ///
    /// # Errors
    ///
    /// Propagates the wrapped record's validation error.
    pub fn validate_record(&self) -> Result<(), TelemetryValidationError> {
        match &self.body {
            TelemetryBody::Activity(activity) => activity.validate_record()?,
            TelemetryBody::Log(log) => log.validate_record()?,
            TelemetryBody::Metric(metric) => metric.validate_record()?,
        }
        Ok(())
    }
}

/// A decoded telemetry record paired with the JSON text it came from.
///
/// The lowercase JSON is computed once at construction (locale-independent
/// folding) and backs case-insensitive filtering.
#[derive(Debug, Clone)]
pub struct TelemetryItem {
    json: String,
    lower_case_json: String,
    telemetry: Telemetry,
}

impl TelemetryItem {
    /// Creates an item from the raw JSON text and its decoded form.
    #[must_use]
    pub fn new(json: impl Into<String>, telemetry: Telemetry) -> Self {
        let json = json.into();
        Self {
            lower_case_json: json.to_lowercase(),
            json,
            telemetry,
        }
    }

    /// The raw JSON text.
    #[must_use]
    pub fn json(&self) -> &str {
        &self.json
    }

    /// The JSON text folded to lowercase.
    #[must_use]
    pub fn lower_case_json(&self) -> &str {
        &self.lower_case_json
    }

    /// The decoded telemetry.
    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// The record timestamp.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.telemetry.timestamp()
    }

    /// The activity duration, when the record is an activity.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.telemetry.activity().and_then(|activity| activity.duration)
    }
}
