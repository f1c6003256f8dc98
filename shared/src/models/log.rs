//! Log record data model and classification.

use crate::models::attributes::AttributeMap;
use crate::models::telemetry::TelemetryType;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Maximum accepted length of an exception cause chain. Chains deeper than
/// this are assumed to be malformed input.
const MAX_CAUSE_DEPTH: usize = 64;

/// Log severity level as reported by the traced process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    /// Most verbose diagnostics.
    Trace,
    /// Debug information.
    Debug,
    /// Informational messages.
    Information,
    /// Warning conditions.
    Warning,
    /// Error conditions.
    Error,
    /// Fatal conditions.
    Critical,
    /// Logging disabled; carries no display code.
    None,
}

impl LogLevel {
    /// The three-letter display code for the level, or `None` for
    /// [`LogLevel::None`].
    #[must_use]
    pub fn abbreviation(self) -> Option<&'static str> {
        match self {
            Self::Trace => Some("VRB"),
            Self::Debug => Some("DBG"),
            Self::Information => Some("INF"),
            Self::Warning => Some("WRN"),
            Self::Error => Some("ERR"),
            Self::Critical => Some("FTL"),
            Self::None => None,
        }
    }
}

/// Exception details attached to a log record.
///
/// `inner_exception` links the next cause, forming a singly-linked chain.
/// Ownership rules out cycles; [`LogRecord::validate_record`] additionally
/// bounds the depth against malformed input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExceptionInfo {
    /// Exception message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Pre-formatted display text (usually the full stack trace).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Exception type name.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// The cause of this exception, when present.
    #[serde(rename = "innerException", skip_serializing_if = "Option::is_none")]
    pub inner_exception: Option<Box<ExceptionInfo>>,
}

impl ExceptionInfo {
    /// Iterates this exception and its causes, outermost first.
    ///
    /// The iterator stops after [`MAX_CAUSE_DEPTH`] entries.
    pub fn chain(&self) -> CauseChain<'_> {
        CauseChain {
            next: Some(self),
            remaining: MAX_CAUSE_DEPTH,
        }
    }
}

/// Iterator over an exception cause chain. See [`ExceptionInfo::chain`].
pub struct CauseChain<'a> {
    next: Option<&'a ExceptionInfo>,
    remaining: usize,
}

impl<'a> Iterator for CauseChain<'a> {
    type Item = &'a ExceptionInfo;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = current.inner_exception.as_deref();
        Some(current)
    }
}

/// The event identifier attached to a log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    /// Numeric identifier.
    pub id: i32,
    /// Event name, when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A decoded log record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct LogRecord {
    /// Raw body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Message with placeholders already substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,

    /// Severity level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// Timestamp when the record was emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Exception attached to the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,

    /// Record attributes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeMap>,

    /// Correlated trace identifier.
    #[validate(length(min = 1, message = "Trace ID cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Correlated span identifier.
    #[validate(length(min = 1, message = "Span ID cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,

    /// Logger category name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    /// Event identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
}

/// Errors that can occur during log record validation.
#[derive(Debug, Error)]
pub enum LogValidationError {
    /// The trace ID is present but empty.
    #[error("Trace ID cannot be empty")]
    EmptyTraceId,

    /// The span ID is present but empty.
    #[error("Span ID cannot be empty")]
    EmptySpanId,

    /// The exception cause chain exceeds the accepted depth.
    #[error("Exception cause chain exceeds {MAX_CAUSE_DEPTH} entries")]
    ExceptionChainTooDeep,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl LogRecord {
    /// The telemetry type of the record.
    #[must_use]
    pub fn telemetry_type(&self) -> TelemetryType {
        if self.exception.is_some() {
            TelemetryType::Exception
        } else {
            TelemetryType::Message
        }
    }

    /// The trace-correlation identifiers under their display labels, or
    /// `None` when the record carries neither identifier.
    #[must_use]
    pub fn trace_ids(&self) -> Option<IndexMap<&'static str, String>> {
        let mut ids = IndexMap::new();
        if let Some(trace_id) = &self.trace_id {
            ids.insert("TraceID", trace_id.clone());
        }
        if let Some(span_id) = &self.span_id {
            ids.insert("SpanID", span_id.clone());
        }
        if ids.is_empty() {
            return None;
        }
        Some(ids)
    }

    /// The leveled display message: `"[{LVL}] {message}"` with newlines
    /// flattened.
    ///
    /// Requires both a level and a formatted message; a level of
    /// [`LogLevel::None`] has no display code, so no message is produced.
    #[must_use]
    pub fn display_message(&self) -> Option<String> {
        let level = self.log_level?.abbreviation()?;
        let message = self.formatted_message.as_ref()?;
        Some(
            format!("[{level}] {message}")
                .replace('\r', "")
                .replace('\n', " "),
        )
    }

    /// Validates the log record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The trace ID or span ID is present but empty
    /// - The exception cause chain is deeper than the accepted bound
    pub fn validate_record(&self) -> Result<(), LogValidationError> {
        if matches!(&self.trace_id, Some(id) if id.is_empty()) {
            return Err(LogValidationError::EmptyTraceId);
        }
        if matches!(&self.span_id, Some(id) if id.is_empty()) {
            return Err(LogValidationError::EmptySpanId);
        }
        let mut depth = 0;
        let mut current = self.exception.as_ref();
        while let Some(exception) = current {
            depth += 1;
            if depth > MAX_CAUSE_DEPTH {
                return Err(LogValidationError::ExceptionChainTooDeep);
            }
            current = exception.inner_exception.as_deref();
        }
        self.validate()?;
        Ok(())
    }
}
