//! Tracelens Shared Library
//!
//! This crate contains the telemetry data models and the classification and
//! derivation logic used across Tracelens: given a decoded trace span
//! ("activity"), a log record, or a metric sample, it computes the secondary
//! attributes a viewer needs — telemetry type, dependency type, error status,
//! extracted exceptions, display strings, trace-correlation identifiers, and
//! elapsed-time formatting.
//!
//! # Modules
//!
//! - [`models`] - Data models for activities, logs, and metrics with their
//!   derived accessors
//! - [`duration`] - TimeSpan text parsing and human-scaled duration display
//! - [`decode`] - Decoding telemetry items from debug-output lines
//! - [`session`] - In-memory telemetry collection with filtering and ordering
//!
//! # Example
//!
//! ```
//! use shared::models::{Activity, ActivityKind, TelemetryType};
//!
//! let activity = Activity {
//!     kind: Some(ActivityKind::Server),
//!     tags: Some(shared::models::AttributeMap::new().with("url.path", "/api/users")),
//!     ..Activity::default()
//! };
//!
//! assert_eq!(activity.telemetry_type(), TelemetryType::Request);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod decode;
pub mod duration;
pub mod models;
pub mod session;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
