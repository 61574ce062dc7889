//! Temporal value variants. Dates/times are kept in the same raw shape the
//! wire carries them (epoch-day, nanos-of-day, epoch-second) rather than
//! eagerly converting to `chrono` types, since a server-sent zone id that
//! this process doesn't recognise must still round-trip as an opaque value
//! (see [`super::Value::Unsupported`]). `chrono` is used only where we need
//! to actually compute a calendar projection for a typed getter.

/// Date as a day offset from the Unix epoch (1970-01-01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub epoch_day: i64,
}

impl Date {
    pub fn to_naive_date(self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_num_days_from_ce_opt(
            (self.epoch_day + 719163) as i32, // 719163 = days from CE to 1970-01-01
        )
    }
}

/// Time-of-day with a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub nanos_of_day: i64,
    pub offset_seconds: i32,
}

/// Time-of-day with no associated offset or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub nanos_of_day: i64,
}

/// A date+time with no associated offset or zone; `epoch_second` is always
/// interpreted as a UTC instant regardless of the driver's UTC-patch mode
/// (LocalDateTime never had a legacy/UTC ambiguity — only zoned DateTime does).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDateTime {
    pub epoch_second: i64,
    pub nano: i32,
}

/// Whether a zoned `DateTime`'s `epoch_second` is a genuine UTC instant
/// (Bolt >= 5.0, signatures `I`/`i`) or the pre-5.0 "local" epoch second
/// that must be combined with the offset/zone to recover the real instant
/// (signatures `F`/`f`). The two encodings are mutually exclusive under a
/// single negotiated Bolt version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeBaseline {
    Legacy,
    Utc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zone {
    Offset(i32),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    pub epoch_second: i64,
    pub nano: i32,
    pub zone: Zone,
    pub baseline: DateTimeBaseline,
}

impl DateTime {
    /// The true UTC instant, resolving the legacy local-epoch encoding by
    /// subtracting the fixed offset (named zones can't be resolved without a
    /// tz database and are surfaced as `Unsupported` before reaching here).
    pub fn utc_epoch_second(&self) -> Option<i64> {
        match (&self.baseline, &self.zone) {
            (DateTimeBaseline::Utc, _) => Some(self.epoch_second),
            (DateTimeBaseline::Legacy, Zone::Offset(offset)) => {
                Some(self.epoch_second - *offset as i64)
            }
            (DateTimeBaseline::Legacy, Zone::Named(_)) => None,
        }
    }
}

/// An ISO-ish duration: months/days are kept separate from seconds/nanos
/// because they are calendar-relative (not a fixed number of seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanos: i32,
}

impl Duration {
    pub fn new(months: i64, days: i64, seconds: i64, nanos: i32) -> Self {
        debug_assert!((0..1_000_000_000).contains(&nanos));
        Duration {
            months,
            days,
            seconds,
            nanos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_zero_is_unix_epoch() {
        let d = Date { epoch_day: 0 };
        assert_eq!(
            d.to_naive_date(),
            chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
        );
    }

    #[test]
    fn legacy_datetime_resolves_via_offset() {
        let dt = DateTime {
            epoch_second: 1000,
            nano: 0,
            zone: Zone::Offset(3600),
            baseline: DateTimeBaseline::Legacy,
        };
        assert_eq!(dt.utc_epoch_second(), Some(1000 - 3600));
    }

    #[test]
    fn utc_datetime_is_already_resolved() {
        let dt = DateTime {
            epoch_second: 1000,
            nano: 0,
            zone: Zone::Offset(3600),
            baseline: DateTimeBaseline::Utc,
        };
        assert_eq!(dt.utc_epoch_second(), Some(1000));
    }
}
