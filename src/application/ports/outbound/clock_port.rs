use chrono::{DateTime, Utc};

/// Source of wall-clock time, swappable in tests
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
