/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Conversion jobs are identified by a generated UUID, stored as a string
/// in the volume attribute bag while the job is in flight.
pub type JobId = uuid::Uuid;
