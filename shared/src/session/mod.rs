//! In-memory telemetry collection with filtering and ordering.
//!
//! A [`TelemetrySession`] stores every decoded item and maintains a visible
//! index under the current filter state: per-type visibility toggles, a
//! substring filter over the raw JSON text, and an ordering mode. Items are
//! never mutated; filter changes only rebuild the index.

use crate::models::{TelemetryItem, TelemetryType};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// Ordering applied to the visible telemetry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Items appear in the order they arrived.
    #[default]
    Arrival,
    /// Items are ordered by their timestamp.
    Timestamp,
    /// Items are ordered by their activity duration.
    Duration,
}

/// Error returned when parsing an unknown sort mode name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort mode: '{0}' (expected 'arrival', 'timestamp', or 'duration')")]
pub struct ParseSortModeError(String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "timestamp" => Ok(Self::Timestamp),
            "duration" => Ok(Self::Duration),
            _ => Err(ParseSortModeError(s.to_string())),
        }
    }
}

/// An append-only telemetry store with a filtered, ordered view.
///
/// # Example
///
/// ```
/// use shared::decode::decode_line;
/// use shared::session::TelemetrySession;
///
/// let mut session = TelemetrySession::new();
/// session.set_filter("disk");
///
/// let item = decode_line(r#"{"log": {"formattedMessage": "disk low"}}"#).unwrap();
/// assert!(session.push(item).is_some());
/// assert_eq!(session.visible_len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TelemetrySession {
    items: Vec<TelemetryItem>,
    visible: Vec<usize>,
    filter: String,
    filter_escaped: String,
    filter_lower_case_escaped: String,
    case_insensitive: bool,
    sort: SortMode,
    hidden_types: HashSet<TelemetryType>,
}

impl TelemetrySession {
    /// Creates an empty session with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an item and inserts it into the visible view when it passes
    /// the current filters.
    ///
    /// Returns the position at which the item became visible, or `None` when
    /// it was filtered out. The position respects the active sort mode.
    pub fn push(&mut self, item: TelemetryItem) -> Option<usize> {
        self.items.push(item);
        let index = self.items.len() - 1;
        if !self.matches(&self.items[index]) {
            return None;
        }
        let position = self.insertion_position(index);
        self.visible.insert(position, index);
        Some(position)
    }

    /// Sets the substring filter over the raw JSON.
    ///
    /// Backslashes in the filter are escaped so the text matches the escaped
    /// JSON form; a lowercase copy backs case-insensitive matching.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.filter_escaped = escape_json_fragment(filter);
        self.filter_lower_case_escaped = self.filter_escaped.to_lowercase();
        self.rebuild();
    }

    /// Switches between case-sensitive and case-insensitive filtering.
    pub fn set_case_insensitive(&mut self, case_insensitive: bool) {
        self.case_insensitive = case_insensitive;
        self.rebuild();
    }

    /// Sets the ordering of the visible view.
    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
        self.rebuild();
    }

    /// Shows or hides a telemetry type.
    pub fn set_type_visible(&mut self, telemetry_type: TelemetryType, visible: bool) {
        if visible {
            self.hidden_types.remove(&telemetry_type);
        } else {
            self.hidden_types.insert(telemetry_type);
        }
        self.rebuild();
    }

    /// Returns true when the given type is currently shown.
    #[must_use]
    pub fn is_type_visible(&self, telemetry_type: TelemetryType) -> bool {
        !self.hidden_types.contains(&telemetry_type)
    }

    /// Removes all stored items. Filter settings are kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.visible.clear();
    }

    /// Iterates the visible items in view order.
    pub fn visible_items(&self) -> impl Iterator<Item = &TelemetryItem> {
        self.visible.iter().map(|&index| &self.items[index])
    }

    /// Number of stored items, visible or not.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.items.len()
    }

    /// Number of items in the visible view.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// True when no items are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn rebuild(&mut self) {
        let mut visible: Vec<usize> = (0..self.items.len())
            .filter(|&index| self.matches(&self.items[index]))
            .collect();
        match self.sort {
            SortMode::Arrival => {}
            SortMode::Timestamp => {
                visible.sort_by_key(|&index| timestamp_key(&self.items[index]));
            }
            SortMode::Duration => {
                visible.sort_by_key(|&index| duration_key(&self.items[index]));
            }
        }
        self.visible = visible;
    }

    fn insertion_position(&self, index: usize) -> usize {
        match self.sort {
            SortMode::Arrival => self.visible.len(),
            SortMode::Timestamp => {
                let key = timestamp_key(&self.items[index]);
                self.visible
                    .partition_point(|&i| timestamp_key(&self.items[i]) <= key)
            }
            SortMode::Duration => {
                let key = duration_key(&self.items[index]);
                self.visible
                    .partition_point(|&i| duration_key(&self.items[i]) <= key)
            }
        }
    }

    fn matches(&self, item: &TelemetryItem) -> bool {
        if self
            .hidden_types
            .contains(&item.telemetry().telemetry_type())
        {
            return false;
        }
        if self.filter.is_empty() {
            return true;
        }
        if self.case_insensitive {
            item.lower_case_json()
                .contains(&self.filter_lower_case_escaped)
        } else {
            item.json().contains(&self.filter_escaped)
        }
    }
}

fn timestamp_key(item: &TelemetryItem) -> DateTime<Utc> {
    item.timestamp().unwrap_or(DateTime::UNIX_EPOCH)
}

fn duration_key(item: &TelemetryItem) -> Duration {
    item.duration().unwrap_or_else(Duration::zero)
}

/// Escapes a filter fragment so it matches JSON-escaped text.
fn escape_json_fragment(filter: &str) -> String {
    filter.replace('\\', "\\\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_line;

    fn log_item(message: &str) -> TelemetryItem {
        let json = format!(r#"{{"log": {{"formattedMessage": "{message}", "logLevel": "Information"}}}}"#);
        decode_line(&json).unwrap()
    }

    fn activity_item(timestamp: &str, duration: &str) -> TelemetryItem {
        let json = format!(
            r#"{{"activity": {{"startTime": "{timestamp}", "duration": "{duration}"}}}}"#
        );
        decode_line(&json).unwrap()
    }

    #[test]
    fn test_push_returns_visible_position() {
        let mut session = TelemetrySession::new();

        assert_eq!(session.push(log_item("first")), Some(0));
        assert_eq!(session.push(log_item("second")), Some(1));
        assert_eq!(session.total_len(), 2);
        assert_eq!(session.visible_len(), 2);
    }

    #[test]
    fn test_filter_hides_non_matching() {
        let mut session = TelemetrySession::new();
        session.set_filter("disk");

        assert!(session.push(log_item("disk low")).is_some());
        assert!(session.push(log_item("memory low")).is_none());
        assert_eq!(session.total_len(), 2);
        assert_eq!(session.visible_len(), 1);
    }

    #[test]
    fn test_filter_case_sensitivity() {
        let mut session = TelemetrySession::new();
        session.set_filter("DISK");

        assert!(session.push(log_item("disk low")).is_none());

        session.set_case_insensitive(true);
        assert_eq!(session.visible_len(), 1);
    }

    #[test]
    fn test_filter_escapes_backslashes() {
        // The raw JSON stores `C:\temp` as `C:\\temp`; a filter typed as
        // `C:\temp` must still match.
        let mut session = TelemetrySession::new();
        let item = decode_line(r#"{"log": {"formattedMessage": "read C:\\temp\\a.txt"}}"#).unwrap();

        session.set_filter("C:\\temp");
        assert!(session.push(item).is_some());
    }

    #[test]
    fn test_filter_change_rebuilds_view() {
        let mut session = TelemetrySession::new();
        session.push(log_item("disk low"));
        session.push(log_item("memory low"));

        session.set_filter("memory");
        assert_eq!(session.visible_len(), 1);

        session.set_filter("");
        assert_eq!(session.visible_len(), 2);
    }

    #[test]
    fn test_hidden_types() {
        let mut session = TelemetrySession::new();
        session.set_type_visible(TelemetryType::Message, false);

        assert!(!session.is_type_visible(TelemetryType::Message));
        assert!(session.push(log_item("hidden")).is_none());

        session.set_type_visible(TelemetryType::Message, true);
        assert_eq!(session.visible_len(), 1);
    }

    #[test]
    fn test_sorted_insertion_by_timestamp() {
        let mut session = TelemetrySession::new();
        session.set_sort(SortMode::Timestamp);

        session.push(activity_item("2024-05-01T10:00:05Z", "00:00:01"));
        let position = session.push(activity_item("2024-05-01T10:00:01Z", "00:00:01"));

        assert_eq!(position, Some(0));
        let timestamps: Vec<_> = session
            .visible_items()
            .map(|item| item.timestamp().unwrap())
            .collect();
        assert!(timestamps[0] < timestamps[1]);
    }

    #[test]
    fn test_sorted_insertion_by_duration() {
        let mut session = TelemetrySession::new();
        session.set_sort(SortMode::Duration);

        session.push(activity_item("2024-05-01T10:00:00Z", "00:00:05"));
        session.push(activity_item("2024-05-01T10:00:00Z", "00:00:01"));
        session.push(activity_item("2024-05-01T10:00:00Z", "00:00:03"));

        let durations: Vec<_> = session
            .visible_items()
            .map(|item| item.duration().unwrap().num_seconds())
            .collect();
        assert_eq!(durations, [1, 3, 5]);
    }

    #[test]
    fn test_items_without_sort_key_order_first() {
        let mut session = TelemetrySession::new();
        session.set_sort(SortMode::Duration);

        session.push(activity_item("2024-05-01T10:00:00Z", "00:00:05"));
        session.push(log_item("no duration"));

        let first = session.visible_items().next().unwrap();
        assert!(first.duration().is_none());
    }

    #[test]
    fn test_clear_keeps_filters() {
        let mut session = TelemetrySession::new();
        session.set_filter("disk");
        session.push(log_item("disk low"));

        session.clear();

        assert!(session.is_empty());
        assert_eq!(session.visible_len(), 0);
        assert!(session.push(log_item("memory low")).is_none());
    }

    #[test]
    fn test_sort_mode_from_str() {
        assert_eq!("timestamp".parse::<SortMode>(), Ok(SortMode::Timestamp));
        assert_eq!("Arrival".parse::<SortMode>(), Ok(SortMode::Arrival));
        assert!("bogus".parse::<SortMode>().is_err());
    }
}
