//! Calendar arithmetic for `<time.h>`.
//!
//! Conversions between seconds since the Unix epoch and broken-down UTC
//! time, plus the `asctime` layout. Host clocks and time zones are the ABI
//! layer's business.

/// Microsecond ticks per second reported by `clock`.
pub const CLOCKS_PER_SEC: i64 = 1_000_000;

const SECS_PER_DAY: i64 = 86_400;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A `struct tm`. Months count from 0 and years from 1900.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokenDownTime {
    pub sec: i32,
    pub min: i32,
    pub hour: i32,
    pub mday: i32,
    pub mon: i32,
    pub year: i32,
    pub wday: i32,
    pub yday: i32,
    pub isdst: i32,
}

/// Days from 1970-01-01 to `year-month-day` (proleptic Gregorian, month 1..=12).
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let mp = (month + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: `(year, month 1..=12, day 1..=31)`.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Broken-down UTC time for `secs` since the epoch. Negative values count
/// backwards from 1970.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn epoch_to_broken_down(secs: i64) -> BrokenDownTime {
    let days = secs.div_euclid(SECS_PER_DAY);
    let rem = secs.rem_euclid(SECS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    BrokenDownTime {
        sec: (rem % 60) as i32,
        min: (rem / 60 % 60) as i32,
        hour: (rem / 3600) as i32,
        mday: day as i32,
        mon: (month - 1) as i32,
        year: (year - 1900) as i32,
        // 1970-01-01 was a Thursday.
        wday: (days + 4).rem_euclid(7) as i32,
        yday: (days - days_from_civil(year, 1, 1)) as i32,
        isdst: 0,
    }
}

/// Seconds since the epoch for `tm` read as UTC.
///
/// Fields outside their usual ranges carry into the next larger unit, so
/// January 32nd is February 1st and a negative hour steps back a day.
/// `wday`, `yday` and `isdst` are ignored.
#[must_use]
pub fn broken_down_to_epoch(tm: &BrokenDownTime) -> i64 {
    let months = (i64::from(tm.year) + 1900) * 12 + i64::from(tm.mon);
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;
    let days = days_from_civil(year, month, 1) + i64::from(tm.mday) - 1;
    days * SECS_PER_DAY
        + i64::from(tm.hour) * 3600
        + i64::from(tm.min) * 60
        + i64::from(tm.sec)
}

/// `tm` with every field brought into range and `wday`/`yday` filled in.
#[must_use]
pub fn normalize(tm: &BrokenDownTime) -> BrokenDownTime {
    BrokenDownTime {
        isdst: tm.isdst,
        ..epoch_to_broken_down(broken_down_to_epoch(tm))
    }
}

/// The `asctime` text: `"Thu Jan  1 00:00:00 1970\n"`.
#[must_use]
pub fn asctime(tm: &BrokenDownTime) -> String {
    let weekday = WEEKDAYS[tm.wday.rem_euclid(7) as usize];
    let month = MONTHS[tm.mon.rem_euclid(12) as usize];
    format!(
        "{weekday} {month}{:>3} {:02}:{:02}:{:02} {}\n",
        tm.mday,
        tm.hour,
        tm.min,
        tm.sec,
        i64::from(tm.year) + 1900
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_origin() {
        let tm = epoch_to_broken_down(0);
        assert_eq!((tm.year, tm.mon, tm.mday), (70, 0, 1));
        assert_eq!((tm.hour, tm.min, tm.sec), (0, 0, 0));
        assert_eq!((tm.wday, tm.yday), (4, 0));
    }

    #[test]
    fn leap_day_and_negative_epochs() {
        let tm = epoch_to_broken_down(951_827_696);
        assert_eq!((tm.year, tm.mon, tm.mday), (100, 1, 29));
        assert_eq!((tm.hour, tm.min, tm.sec), (12, 34, 56));
        assert_eq!((tm.wday, tm.yday), (2, 59));
        assert_eq!(broken_down_to_epoch(&tm), 951_827_696);

        let tm = epoch_to_broken_down(-1);
        assert_eq!((tm.year, tm.mon, tm.mday), (69, 11, 31));
        assert_eq!((tm.hour, tm.min, tm.sec), (23, 59, 59));
        assert_eq!(tm.wday, 3);
        assert_eq!(broken_down_to_epoch(&tm), -1);
    }

    #[test]
    fn out_of_range_fields_carry() {
        let jan32 = BrokenDownTime {
            mday: 32,
            mon: 0,
            year: 121,
            hour: 12,
            ..BrokenDownTime::default()
        };
        let tm = normalize(&jan32);
        assert_eq!((tm.year, tm.mon, tm.mday, tm.hour), (121, 1, 1, 12));
        assert_eq!(tm.yday, 31);

        let month13 = BrokenDownTime {
            mday: 1,
            mon: 12,
            year: 99,
            hour: -1,
            ..BrokenDownTime::default()
        };
        let tm = normalize(&month13);
        assert_eq!((tm.year, tm.mon, tm.mday, tm.hour), (99, 11, 31, 23));
    }

    #[test]
    fn asctime_layout() {
        assert_eq!(asctime(&epoch_to_broken_down(0)), "Thu Jan  1 00:00:00 1970\n");
        assert_eq!(
            asctime(&epoch_to_broken_down(951_827_696)),
            "Tue Feb 29 12:34:56 2000\n"
        );
    }
}
