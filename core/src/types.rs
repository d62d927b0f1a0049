//! Shared primitive types used across the desk.

/// A stable identifier for a transaction or case.
pub type EntityId = String;

/// Records are dated at calendar-day granularity.
pub type Day = chrono::NaiveDate;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;
