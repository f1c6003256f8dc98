//! Elapsed-time parsing and presentation.
//!
//! Traced processes report span durations as TimeSpan text
//! (`[-]d.hh:mm:ss[.ffffff]`) rather than a numeric duration. This module
//! decodes that format into a [`chrono::Duration`] and renders durations as
//! compact, human-scaled strings for display.

pub mod format;
pub mod timespan;

pub use format::format_duration;
pub use timespan::{parse_timespan, to_timespan_string, TimeSpanError};
