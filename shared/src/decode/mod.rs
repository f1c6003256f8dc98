//! Decoding telemetry items from debug-output text.
//!
//! A traced process prints one JSON object per telemetry record on its debug
//! output, usually preceded by logger noise. [`decode_line`] tolerates that
//! noise and skips anything that is not telemetry; [`decode_json`] is the
//! strict form used once the JSON text is already isolated.

use crate::models::{Telemetry, TelemetryItem};
use thiserror::Error;

/// Errors that can occur while decoding telemetry JSON.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The text is not a valid telemetry record. Covers JSON syntax errors,
    /// malformed duration text, and records with no variant present.
    #[error("invalid telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes one JSON object into a [`TelemetryItem`].
///
/// # Errors
///
/// Returns [`DecodeError`] when the text is not valid telemetry JSON. A
/// malformed duration field or a record with none of activity/log/metric
/// fails the whole decode rather than defaulting.
pub fn decode_json(json: &str) -> Result<TelemetryItem, DecodeError> {
    let telemetry: Telemetry = serde_json::from_str(json)?;
    Ok(TelemetryItem::new(json, telemetry))
}

/// Decodes one line of debug output, returning `None` for non-telemetry
/// lines.
///
/// The line may carry a logger prefix before the JSON object; everything
/// before the first `{` is ignored.
#[must_use]
pub fn decode_line(line: &str) -> Option<TelemetryItem> {
    let start = line.find('{')?;
    let json = line[start..].trim();
    match decode_json(json) {
        Ok(item) => Some(item),
        Err(error) => {
            tracing::trace!(%error, "skipping non-telemetry line");
            None
        }
    }
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;
