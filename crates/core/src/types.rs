/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Zero-based slide position within the deck. Stored as PostgreSQL INTEGER.
pub type Position = i32;
