use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

pub const INVALID_DATE: &str = "Invalid date";
pub const INVALID_TIME: &str = "Invalid time";
pub const UNKNOWN_TIME: &str = "Unknown time";

// Same bound as an ECMAScript Date, the backend's clients agree on it
const MAX_TIMESTAMP_MS: f64 = 8.64e15;

const ABSOLUTE_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p %Z";

fn to_datetime(timestamp_ms: Option<f64>) -> Option<DateTime<Utc>> {
    let timestamp_ms = timestamp_ms.filter(|timestamp_ms| {
        timestamp_ms.is_finite() && timestamp_ms.abs() <= MAX_TIMESTAMP_MS
    })?;

    #[expect(clippy::cast_possible_truncation)]
    let timestamp_ms = timestamp_ms.floor() as i64;

    DateTime::from_timestamp_millis(timestamp_ms)
}

/// Date and time in the local time zone, e.g. `Nov 14, 2023, 10:13:20 PM +01:00`.
pub fn format_absolute(timestamp_ms: Option<f64>) -> String {
    format_absolute_in(timestamp_ms, &Local)
}

fn format_absolute_in<Tz>(timestamp_ms: Option<f64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    to_datetime(timestamp_ms).map_or_else(
        || INVALID_DATE.to_string(),
        |datetime| datetime.with_timezone(tz).format(ABSOLUTE_FORMAT).to_string(),
    )
}

pub fn format_relative(timestamp_ms: Option<f64>) -> String {
    format_relative_at(timestamp_ms, Utc::now())
}

/// Buckets the elapsed time into seconds, minutes, hours and days, then falls
/// back to [`format_absolute`] past 30 days. Timestamps in the future are not
/// clamped.
pub fn format_relative_at(timestamp_ms: Option<f64>, now: DateTime<Utc>) -> String {
    let Some(timestamp_ms) = timestamp_ms.filter(|timestamp_ms| timestamp_ms.is_finite()) else {
        return UNKNOWN_TIME.to_string();
    };

    #[expect(clippy::cast_precision_loss)]
    let now_ms = now.timestamp_millis() as f64;

    #[expect(clippy::cast_possible_truncation)]
    let seconds = ((now_ms - timestamp_ms) / 1000.0).floor() as i64;
    if seconds < 60 {
        return ago(seconds, "second");
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return ago(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return ago(hours, "hour");
    }

    let days = hours / 24;
    if days < 30 {
        return ago(days, "day");
    }

    format_absolute(Some(timestamp_ms))
}

fn ago(amount: i64, unit: &str) -> String {
    let suffix = if amount == 1 { "" } else { "s" };

    format!("{amount} {unit}{suffix} ago")
}

/// Calendar date in UTC, `YYYY-MM-DD`.
pub fn format_date_only(timestamp_ms: Option<f64>) -> String {
    to_datetime(timestamp_ms).map_or_else(
        || INVALID_DATE.to_string(),
        |datetime| datetime.format("%Y-%m-%d").to_string(),
    )
}

/// Local 24-hour clock time, `HH:MM:SS`.
pub fn format_time_only(timestamp_ms: Option<f64>) -> String {
    format_time_only_in(timestamp_ms, &Local)
}

fn format_time_only_in<Tz: TimeZone>(timestamp_ms: Option<f64>, tz: &Tz) -> String {
    to_datetime(timestamp_ms).map_or_else(
        || INVALID_TIME.to_string(),
        |datetime| display_time(datetime.with_timezone(tz)),
    )
}

pub fn display_time<Tz: TimeZone>(datetime: DateTime<Tz>) -> String {
    datetime.naive_local().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const RECEIVED_AT: f64 = 1_700_000_000_000.0;

    fn received_at() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[expect(clippy::cast_precision_loss)]
    fn millis_before(now: DateTime<Utc>, duration: Duration) -> Option<f64> {
        Some((now - duration).timestamp_millis() as f64)
    }

    #[test]
    fn every_formatter_rejects_non_numeric_input() {
        for input in [None, Some(f64::NAN), Some(f64::INFINITY), Some(f64::NEG_INFINITY)] {
            assert_eq!(format_absolute(input), INVALID_DATE);
            assert_eq!(format_relative(input), UNKNOWN_TIME);
            assert_eq!(format_date_only(input), INVALID_DATE);
            assert_eq!(format_time_only(input), INVALID_TIME);
        }
    }

    #[test]
    fn out_of_range_timestamps_are_invalid_dates() {
        assert_eq!(format_absolute(Some(1e300)), INVALID_DATE);
        assert_eq!(format_date_only(Some(-8.64e15 - 1.0)), INVALID_DATE);
        assert_eq!(format_time_only(Some(9e15)), INVALID_TIME);
    }

    #[test]
    fn absolute_includes_date_time_and_zone() {
        assert_eq!(
            format_absolute_in(Some(RECEIVED_AT), &Utc),
            "Nov 14, 2023, 10:13:20 PM UTC"
        );
    }

    #[test]
    fn relative_uses_singular_for_one() {
        let now = received_at();

        assert_eq!(
            format_relative_at(millis_before(now, Duration::seconds(1)), now),
            "1 second ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::minutes(1)), now),
            "1 minute ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::days(1)), now),
            "1 day ago"
        );
    }

    #[test]
    fn relative_buckets_floor_to_whole_units() {
        let now = received_at();

        assert_eq!(format_relative_at(Some(RECEIVED_AT), now), "0 seconds ago");
        assert_eq!(
            format_relative_at(millis_before(now, Duration::seconds(45)), now),
            "45 seconds ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::milliseconds(59_999)), now),
            "59 seconds ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::minutes(59)), now),
            "59 minutes ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::minutes(90)), now),
            "1 hour ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::hours(23)), now),
            "23 hours ago"
        );
        assert_eq!(
            format_relative_at(millis_before(now, Duration::days(29)), now),
            "29 days ago"
        );
    }

    #[test]
    fn relative_falls_back_to_absolute_after_thirty_days() {
        let now = received_at();
        let old = millis_before(now, Duration::days(30));

        assert_eq!(format_relative_at(old, now), format_absolute(old));
    }

    #[test]
    fn date_only_is_utc_calendar_date() {
        assert_eq!(format_date_only(Some(RECEIVED_AT)), "2023-11-14");
        assert_eq!(format_date_only(Some(0.0)), "1970-01-01");
    }

    #[test]
    fn time_only_is_24_hour_clock() {
        assert_eq!(format_time_only_in(Some(RECEIVED_AT), &Utc), "22:13:20");
        assert_eq!(format_time_only_in(Some(RECEIVED_AT + 999.0), &Utc), "22:13:20");
    }
}
