use time::{Date, OffsetDateTime};

/// Source of "today" for date-relative aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(Date),
}

impl Clock {
    /// Local calendar date, the same offset the log timestamps use. Falls
    /// back to UTC when the local offset cannot be determined.
    pub fn today(&self) -> Date {
        match self {
            Self::System => OffsetDateTime::now_local()
                .unwrap_or_else(|_| OffsetDateTime::now_utc())
                .date(),
            Self::Fixed(date) => *date,
        }
    }
}
