//! Data models for decoded telemetry.
//!
//! This module contains the record structures for activities (trace spans),
//! logs, and metrics, together with the classification and derivation logic
//! that computes their display-ready secondary attributes.

pub mod activity;
pub mod attributes;
pub mod log;
pub mod metric;
pub mod telemetry;

pub use activity::{
    Activity, ActivityEvent, ActivityException, ActivityKind, ActivitySource, ActivityStatusCode,
    ActivityValidationError, DependencyType,
};
pub use attributes::AttributeMap;
pub use log::{EventId, ExceptionInfo, LogLevel, LogRecord, LogValidationError};
pub use metric::{Metric, MetricPoint, MetricValidationError, PointValue};
pub use telemetry::{
    EmptyTelemetry, ParseTelemetryTypeError, Telemetry, TelemetryBody, TelemetryItem,
    TelemetryType, TelemetryValidationError,
};
