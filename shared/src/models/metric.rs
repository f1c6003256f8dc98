//! Metric data model and summarization.

use crate::models::attributes::AttributeMap;
use crate::models::telemetry::TelemetryType;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// The single numeric value carried by a metric point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointValue {
    /// Integer sum.
    LongSum(i64),
    /// Floating-point sum.
    DoubleSum(f64),
    /// Integer gauge reading.
    LongGauge(i64),
    /// Floating-point gauge reading.
    DoubleGauge(f64),
    /// Histogram observation count.
    HistogramCount(i64),
    /// Histogram observation sum.
    HistogramSum(f64),
}

impl std::fmt::Display for PointValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LongSum(value) | Self::LongGauge(value) | Self::HistogramCount(value) => {
                write!(f, "{value}")
            }
            Self::DoubleSum(value) | Self::DoubleGauge(value) | Self::HistogramSum(value) => {
                write!(f, "{value}")
            }
        }
    }
}

/// A single measurement within a metric.
///
/// A well-formed point populates exactly one of the numeric fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricPoint {
    /// Start of the measurement window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    /// End of the measurement window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// Tags identifying this point's dimension combination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<AttributeMap>,

    /// Integer sum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_sum: Option<i64>,

    /// Floating-point sum value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_sum: Option<f64>,

    /// Integer gauge value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_gauge: Option<i64>,

    /// Floating-point gauge value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_gauge: Option<f64>,

    /// Histogram observation count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram_count: Option<i64>,

    /// Histogram observation sum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram_sum: Option<f64>,
}

impl MetricPoint {
    /// The measurement window duration, when both bounds are present.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        Some(self.end_time? - self.start_time?)
    }

    /// The point's numeric value: the first populated field in declared
    /// order. Malformed points with several populated fields resolve to the
    /// first rather than failing.
    #[must_use]
    pub fn value(&self) -> Option<PointValue> {
        if let Some(value) = self.long_sum {
            return Some(PointValue::LongSum(value));
        }
        if let Some(value) = self.double_sum {
            return Some(PointValue::DoubleSum(value));
        }
        if let Some(value) = self.long_gauge {
            return Some(PointValue::LongGauge(value));
        }
        if let Some(value) = self.double_gauge {
            return Some(PointValue::DoubleGauge(value));
        }
        if let Some(value) = self.histogram_count {
            return Some(PointValue::HistogramCount(value));
        }
        if let Some(value) = self.histogram_sum {
            return Some(PointValue::HistogramSum(value));
        }
        None
    }

    fn populated_value_fields(&self) -> usize {
        usize::from(self.long_sum.is_some())
            + usize::from(self.double_sum.is_some())
            + usize::from(self.long_gauge.is_some())
            + usize::from(self.double_gauge.is_some())
            + usize::from(self.histogram_count.is_some())
            + usize::from(self.histogram_sum.is_some())
    }
}

/// A decoded metric with its measurement points.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct Metric {
    /// Metric kind tag, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,

    /// Aggregation temporality tag, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporality: Option<String>,

    /// Metric name.
    #[validate(length(min = 1, message = "Metric name cannot be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Metric description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unit of measurement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Name of the meter that produced the metric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_name: Option<String>,

    /// Version of the meter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_version: Option<String>,

    /// Meter-level tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_tags: Option<AttributeMap>,

    /// Measurement points, in reported order.
    pub points: Vec<MetricPoint>,
}

/// Errors that can occur during metric validation.
#[derive(Debug, Error)]
pub enum MetricValidationError {
    /// The metric name is present but empty.
    #[error("Metric name cannot be empty")]
    EmptyName,

    /// A point's end time precedes its start time.
    #[error("Metric point end time cannot be before start time")]
    InvalidTimeRange,

    /// A point populates more than one numeric value field.
    #[error("Metric point carries more than one value kind")]
    ConflictingPointValues,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Metric {
    /// The telemetry type of the record (always [`TelemetryType::Metric`]).
    #[must_use]
    pub fn telemetry_type(&self) -> TelemetryType {
        TelemetryType::Metric
    }

    /// A representative timestamp: the start time of the first point that
    /// has one.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.points.iter().find_map(|point| point.start_time)
    }

    /// The last point reported for each distinct tag combination.
    ///
    /// Points sharing equal tag maps collapse to the most recent; the output
    /// keeps the order in which each tag set first appeared.
    #[must_use]
    pub fn tagged_points(&self) -> Vec<&MetricPoint> {
        let mut keyed: Vec<(Option<&AttributeMap>, &MetricPoint)> = Vec::new();
        for point in &self.points {
            let tags = point.tags.as_ref();
            if let Some(entry) = keyed.iter_mut().find(|(key, _)| *key == tags) {
                entry.1 = point;
            } else {
                keyed.push((tags, point));
            }
        }
        keyed.into_iter().map(|(_, point)| point).collect()
    }

    /// Detail display string: the non-empty parts of name, description, and
    /// meter name joined with `" - "`.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.name, &self.description, &self.meter_name]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(parts.join(" - "))
    }

    /// The meter display string: `"{name}"` or `"{name} ({version})"`.
    #[must_use]
    pub fn meter(&self) -> Option<String> {
        let name = self.meter_name.as_deref().filter(|name| !name.is_empty())?;
        match self.meter_version.as_deref().filter(|v| !v.is_empty()) {
            Some(version) => Some(format!("{name} ({version})")),
            None => Some(name.to_string()),
        }
    }

    /// The measurement duration: the first per-point window found in point
    /// order, or `None` when no point carries both bounds.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.points.iter().find_map(MetricPoint::duration)
    }

    /// Validates the metric.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is present but empty
    /// - A point's end time precedes its start time
    /// - A point populates more than one value field
    pub fn validate_record(&self) -> Result<(), MetricValidationError> {
        if matches!(&self.name, Some(name) if name.is_empty()) {
            return Err(MetricValidationError::EmptyName);
        }
        for point in &self.points {
            if let (Some(start), Some(end)) = (point.start_time, point.end_time) {
                if end < start {
                    return Err(MetricValidationError::InvalidTimeRange);
                }
            }
            if point.populated_value_fields() > 1 {
                return Err(MetricValidationError::ConflictingPointValues);
            }
        }
        self.validate()?;
        Ok(())
    }
}
