//! TimeSpan text decoding.
//!
//! Parses the `[-]d.hh:mm:ss[.ffffff]` elapsed-time format: an optional
//! leading `-` negates the whole value, days are optional and separated from
//! hours by `.`, and fractional seconds are optional.

use chrono::Duration;
use thiserror::Error;

/// Errors produced while parsing TimeSpan text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeSpanError {
    /// Fewer than three `:`-separated fields were present.
    #[error("expected hh:mm:ss fields in '{0}'")]
    MissingFields(String),

    /// A field was not numeric.
    #[error("invalid numeric field '{field}' in '{input}'")]
    InvalidField {
        /// The sub-field that failed to parse.
        field: String,
        /// The full input text.
        input: String,
    },
}

/// Parses TimeSpan text (`[-]d.hh:mm:ss[.ffffff]`) into a [`Duration`].
///
/// The value splits on `:` into at most three fields. When the first field
/// contains a `.`, its left part is whole days (converted to hours); minutes
/// parse as an integer and seconds as a float.
///
/// # Errors
///
/// Returns [`TimeSpanError`] if fewer than three `:`-separated fields are
/// present or any numeric sub-field fails to parse.
///
/// # Examples
///
/// ```
/// use shared::duration::parse_timespan;
/// use chrono::Duration;
///
/// let parsed = parse_timespan("02:03:04").unwrap();
/// assert_eq!(parsed, Duration::hours(2) + Duration::minutes(3) + Duration::seconds(4));
/// ```
pub fn parse_timespan(text: &str) -> Result<Duration, TimeSpanError> {
    match text.strip_prefix('-') {
        Some(rest) => Ok(-parse_unsigned(rest, text)?),
        None => parse_unsigned(text, text),
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn parse_unsigned(value: &str, input: &str) -> Result<Duration, TimeSpanError> {
    let mut fields = value.splitn(3, ':');
    let hours_field = fields.next().unwrap_or_default();
    let minutes_field = fields
        .next()
        .ok_or_else(|| TimeSpanError::MissingFields(input.to_string()))?;
    let seconds_field = fields
        .next()
        .ok_or_else(|| TimeSpanError::MissingFields(input.to_string()))?;

    // A `.` in the first field separates whole days from hours.
    let hours = match hours_field.split_once('.') {
        Some((days, hours)) => parse_integer(days, input)? * 24 + parse_integer(hours, input)?,
        None => parse_integer(hours_field, input)?,
    };
    let minutes = parse_integer(minutes_field, input)?;
    let seconds: f64 = seconds_field
        .parse()
        .map_err(|_| TimeSpanError::InvalidField {
            field: seconds_field.to_string(),
            input: input.to_string(),
        })?;

    let nanos = ((hours * 3_600 + minutes * 60) as f64 + seconds) * 1_000_000_000.0;
    Ok(Duration::nanoseconds(nanos.round() as i64))
}

fn parse_integer(field: &str, input: &str) -> Result<i64, TimeSpanError> {
    field.parse().map_err(|_| TimeSpanError::InvalidField {
        field: field.to_string(),
        input: input.to_string(),
    })
}

/// Formats a [`Duration`] back into TimeSpan text (`[-][d.]hh:mm:ss[.f...]`).
///
/// The fractional part is emitted only when the duration has sub-second
/// precision, with trailing zeros trimmed.
#[must_use]
pub fn to_timespan_string(duration: Duration) -> String {
    let negative = duration < Duration::zero();
    let duration = duration.abs();

    let total_seconds = duration.num_seconds();
    let days = total_seconds / 86_400;
    let hours = (total_seconds / 3_600) % 24;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;

    let mut text = String::new();
    if negative {
        text.push('-');
    }
    if days > 0 {
        text.push_str(&format!("{days}."));
    }
    text.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));

    let nanos = duration.subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    text
}

/// Serde adapter for optional TimeSpan-encoded duration fields.
///
/// Use with `#[serde(with = "crate::duration::timespan::option")]`. A parse
/// failure propagates as a serde error so the surrounding record decode
/// fails rather than silently defaulting.
pub mod option {
    use super::{parse_timespan, to_timespan_string};
    use chrono::Duration;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Serializes an optional duration as TimeSpan text.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_str(&to_timespan_string(*duration)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional duration from TimeSpan text.
    ///
    /// # Errors
    ///
    /// Fails when the text is present but not valid TimeSpan format.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text: Option<String> = Option::deserialize(deserializer)?;
        text.map(|t| parse_timespan(&t).map_err(de::Error::custom))
            .transpose()
    }
}
