/// All primary keys are UUID v7, generated application-side.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (birthdays, release dates, settlement periods).
pub type Date = chrono::NaiveDate;
