use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Display format used in notification messages
pub const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse an ISO-8601 timestamp as stored in the notification state.
///
/// Accepts RFC 3339 (`2024-01-01T12:00:00+00:00`), a naive date-time which is
/// taken as UTC (`2024-01-01T12:00:00`), or a bare date at midnight UTC.
pub fn parse_iso_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolve an IANA timezone name, `None` when the name is unknown
pub fn resolve_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Format a UTC instant in the given zone for message output
pub fn format_in_zone(instant: &DateTime<Utc>, tz: &Tz) -> String {
    tz.from_utc_datetime(&instant.naive_utc())
        .format(MESSAGE_TIME_FORMAT)
        .to_string()
}
