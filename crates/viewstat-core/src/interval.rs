//! Interval grid arithmetic
//!
//! View-count charts use a grid of fixed-width slots anchored to the start of
//! each local day: with the default width of 6 hours the boundaries fall at
//! 00:00, 06:00, 12:00 and 18:00.
//!
//! Boundaries live on the local wall clock. Consecutive slots are found by
//! adding hours to the local time, so the grid keeps its labels across DST
//! changes. Widths that do not divide 24 restart at every local midnight,
//! which makes the last slot of each day shorter.

use crate::error::{Result, ViewstatError};
use chrono::{
    DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use std::fmt;

/// Largest accepted width; a slot never spans more than one local day
pub const MAX_INTERVAL_HOURS: i64 = 24;

/// Width of one chart interval, in hours
pub const DEFAULT_INTERVAL_HOURS: i64 = 6;

/// Validated interval width
///
/// # Examples
/// ```
/// use viewstat_core::interval::IntervalWidth;
///
/// let width = IntervalWidth::from_hours(6).unwrap();
/// assert_eq!(width.hours(), 6);
/// assert!(IntervalWidth::from_hours(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalWidth(u32);

impl IntervalWidth {
    /// Create a width from an hour count
    ///
    /// # Errors
    ///
    /// Returns `ViewstatError::InvalidConfiguration` if `hours` is not positive
    /// or exceeds [`MAX_INTERVAL_HOURS`].
    pub fn from_hours(hours: i64) -> Result<Self> {
        if hours <= 0 {
            return Err(ViewstatError::InvalidConfiguration(format!(
                "interval width must be a positive number of hours, got {hours}"
            )));
        }
        let hours = u32::try_from(hours)
            .ok()
            .filter(|h| i64::from(*h) <= MAX_INTERVAL_HOURS)
            .ok_or_else(|| {
                ViewstatError::InvalidConfiguration(format!(
                    "interval width of {hours} hours exceeds {MAX_INTERVAL_HOURS} hours"
                ))
            })?;
        Ok(Self(hours))
    }

    /// Width in hours
    pub fn hours(&self) -> u32 {
        self.0
    }

    /// Width as a duration
    pub fn duration(&self) -> Duration {
        Duration::hours(i64::from(self.0))
    }

    /// Truncate `timestamp` down to the grid boundary at or before it
    ///
    /// Boundaries are whole multiples of the width counted from local
    /// midnight in `tz`. Widths that do not divide 24 restart at midnight.
    ///
    /// # Examples
    /// ```
    /// use viewstat_core::interval::IntervalWidth;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let width = IntervalWidth::default();
    /// let ts = Utc.with_ymd_and_hms(2024, 3, 5, 14, 37, 12).unwrap();
    /// let boundary = width.floor(ts, &chrono_tz::Tz::UTC);
    /// assert_eq!(boundary, Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
    /// ```
    pub fn floor(&self, timestamp: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
        resolve_local(self.floor_local(timestamp, tz), tz)
    }

    /// Local wall-clock boundary at or before `timestamp`
    pub fn floor_local(&self, timestamp: DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
        let local = timestamp.with_timezone(tz).naive_local();
        let hour = local.hour() - local.hour() % self.0;
        local.date().and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
    }

    /// Local wall-clock boundary following `boundary`
    ///
    /// Stays on the same local day unless the slot would cross midnight, in
    /// which case the next boundary is the following midnight.
    pub fn next_local(&self, boundary: NaiveDateTime) -> NaiveDateTime {
        let next_hour = boundary.hour() + self.0;
        let midnight = boundary.date().and_time(NaiveTime::MIN);
        if next_hour >= 24 {
            midnight + Duration::days(1)
        } else {
            midnight + Duration::hours(i64::from(next_hour))
        }
    }
}

/// Instant of a local wall-clock boundary
///
/// Ambiguous times (clocks going back) resolve to the first occurrence. A
/// boundary skipped by clocks going forward resolves to the instant of the
/// jump, using the offset in effect before it.
pub fn resolve_local(local: NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local).earliest() {
        Some(boundary) => boundary.with_timezone(&Utc),
        None => {
            let before = tz.offset_from_utc_datetime(&(local - Duration::days(1)));
            let offset = i64::from(before.fix().local_minus_utc());
            (local - Duration::seconds(offset)).and_utc()
        }
    }
}

impl Default for IntervalWidth {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_HOURS as u32)
    }
}

impl fmt::Display for IntervalWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.0)
    }
}

/// Human-readable label for an interval starting at `start`
///
/// Day and month without padding, hour padded, minutes always `00`:
/// `5/3 06:00` for 5 March at 06:00 local time.
pub fn format_interval_label(start: DateTime<Utc>, tz: &Tz) -> String {
    let local = start.with_timezone(tz);
    format!("{}/{} {:02}:00", local.day(), local.month(), local.hour())
}
