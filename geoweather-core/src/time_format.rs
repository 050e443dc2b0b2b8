use chrono::{DateTime, Local, TimeZone};

const SECONDS_PER_DAY: i64 = 86_400;

/// Formats a Unix timestamp as 24-hour `HH:mm` in the given timezone.
///
/// Total over `i64`: timestamps outside chrono's representable range keep their
/// time of day but are moved next to the epoch.
pub fn format_hh_mm<Tz>(unix_seconds: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(unix_seconds, 0)
        .or_else(|| DateTime::from_timestamp(unix_seconds.rem_euclid(SECONDS_PER_DAY), 0))
        .unwrap_or_default();

    utc.with_timezone(tz).format("%H:%M").to_string()
}

/// Formats a Unix timestamp in the system's local timezone.
pub fn format_local(unix_seconds: i64) -> String {
    format_hh_mm(unix_seconds, &Local)
}
