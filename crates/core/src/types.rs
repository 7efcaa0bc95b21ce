/// History record ids. Negative values are client-side placeholders that
/// the backend has not confirmed yet.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
