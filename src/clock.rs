//! Wall-clock source and conversions between `time` and the database's
//! chrono-based timestamp type.

use std::fmt::Debug;

use chrono::DateTime;
use sea_orm::prelude::DateTimeWithTimeZone;
use time::OffsetDateTime;

use crate::error::{Error, Result};

/// Source of the current time used for expiry decisions.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// [`Clock`] backed by the system clock, in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Converts a `time::OffsetDateTime` into the UTC `DateTimeWithTimeZone`
/// stored in the `expire_date` column.
pub(crate) fn to_db_datetime(time: OffsetDateTime) -> Result<DateTimeWithTimeZone> {
    DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .map(Into::into)
        .ok_or(Error::TimestampOutOfRange)
}

/// Inverse of [`to_db_datetime`].
pub(crate) fn from_db_datetime(datetime: DateTimeWithTimeZone) -> Result<OffsetDateTime> {
    let nanos = i128::from(datetime.timestamp()) * 1_000_000_000
        + i128::from(datetime.timestamp_subsec_nanos());
    OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| Error::TimestampOutOfRange)
}
