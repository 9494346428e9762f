//! Wall-clock timestamps for the durable event log.
//!
//! Until network time sync completes the RTC reports something close to
//! the epoch.  Stamping records with that would put garbage dates into
//! the log, so [`Clock::now`] yields [`Timestamp::Pending`] until the
//! calendar year is past a sentinel (2020 by default).

use core::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use log::warn;

use super::ports::TimeSource;

/// Placeholder written instead of a date while time sync is pending.
pub const SYNC_PENDING_PLACEHOLDER: &str = "sincronizando relogio...";

/// Layout of a synchronised timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A point in local time, or the recognised "not synced yet" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Pending,
    At(DateTime<FixedOffset>),
}

impl Timestamp {
    pub fn is_synced(&self) -> bool {
        matches!(self, Self::At(_))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str(SYNC_PENDING_PLACEHOLDER),
            Self::At(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
        }
    }
}

/// Formats [`TimeSource`] readings in a fixed local offset.
pub struct Clock<T: TimeSource> {
    source: T,
    offset: FixedOffset,
    sentinel_year: i32,
}

impl<T: TimeSource> Clock<T> {
    /// `utc_offset_secs` is seconds east of UTC (negative west).  An
    /// out-of-range offset falls back to UTC.
    pub fn new(source: T, utc_offset_secs: i32, sentinel_year: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_secs).unwrap_or_else(|| {
            warn!("Clock: invalid UTC offset {}s, using UTC", utc_offset_secs);
            Utc.fix()
        });
        Self {
            source,
            offset,
            sentinel_year,
        }
    }

    pub fn now(&self) -> Timestamp {
        let Some(utc) = DateTime::<Utc>::from_timestamp(self.source.unix_time(), 0) else {
            return Timestamp::Pending;
        };
        let local = utc.with_timezone(&self.offset);
        if local.year() > self.sentinel_year {
            Timestamp::At(local)
        } else {
            Timestamp::Pending
        }
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}
