//! VEVENT extraction on top of the icalendar crate's parser.

use super::models::{non_empty, CalendarEvent};
use crate::error::{parse_error, NotifierResult};
use crate::utils::time::resolve_timezone;
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeZone, Utc};
use icalendar::{
    parser::{read_calendar, unfold, Component},
    CalendarDateTime, DatePerhapsTime,
};
use tracing::{debug, warn};

/// Parse an iCalendar document into events.
///
/// A document that cannot be read at all is an error. Single VEVENTs without
/// a usable DTSTART are skipped with a warning.
pub fn parse_calendar(content: &str) -> NotifierResult<Vec<CalendarEvent>> {
    let unfolded = unfold(content);
    if !unfolded.contains("BEGIN:VCALENDAR") {
        return Err(parse_error("Payload is not an iCalendar document"));
    }

    let calendar = read_calendar(&unfolded).map_err(|e| parse_error(&e.to_string()))?;

    let mut vevents = Vec::new();
    for component in &calendar.components {
        collect_vevents(component, &mut vevents);
    }

    let mut events = Vec::with_capacity(vevents.len());
    for vevent in vevents {
        match event_from_component(vevent) {
            Ok(event) => events.push(event),
            Err(reason) => {
                let uid = vevent
                    .find_prop("UID")
                    .map(|p| p.val.to_string())
                    .unwrap_or_default();
                warn!("Skipping calendar entry '{}': {}", uid, reason);
            }
        }
    }

    Ok(events)
}

/// Walk the component tree, VEVENTs may sit under VCALENDAR or at the top
fn collect_vevents<'a, 'c>(component: &'c Component<'a>, out: &mut Vec<&'c Component<'a>>) {
    if component.name == "VEVENT" {
        out.push(component);
        return;
    }
    for child in &component.components {
        collect_vevents(child, out);
    }
}

fn event_from_component(vevent: &Component<'_>) -> Result<CalendarEvent, String> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.as_ref().trim().to_string())
        .unwrap_or_default();

    // Left blank when absent, the message uses a localised placeholder
    let summary = text_property(vevent, "SUMMARY").unwrap_or_default();

    let start_prop = vevent.find_prop("DTSTART").ok_or("missing DTSTART")?;
    let start = DatePerhapsTime::try_from(start_prop)
        .map(to_utc)
        .map_err(|_| format!("invalid DTSTART '{}'", start_prop.val.as_ref()))?;

    let end = if let Some(end_prop) = vevent.find_prop("DTEND") {
        DatePerhapsTime::try_from(end_prop)
            .map(to_utc)
            .map_err(|_| format!("invalid DTEND '{}'", end_prop.val.as_ref()))?
    } else if let Some(duration) = vevent
        .find_prop("DURATION")
        .and_then(|p| parse_duration(p.val.as_ref()))
    {
        start + duration
    } else {
        start
    };

    Ok(CalendarEvent {
        uid,
        summary,
        start,
        end,
        description: text_property(vevent, "DESCRIPTION"),
        location: text_property(vevent, "LOCATION"),
    })
}

/// Read a TEXT property, unescaped, `None` when absent or blank
fn text_property(component: &Component<'_>, name: &str) -> Option<String> {
    component
        .find_prop(name)
        .map(|p| unescape_text(p.val.as_ref()))
        .and_then(non_empty)
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`)
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(next) => out.push(next),
            None => out.push('\\'),
        }
    }
    out
}

/// Normalise a DTSTART/DTEND value to UTC.
///
/// Dates become midnight UTC and floating times are read as UTC. Zoned times
/// with a TZID chrono-tz does not know are also read as UTC.
fn to_utc(value: DatePerhapsTime) -> DateTime<Utc> {
    match value {
        DatePerhapsTime::Date(date) => date.and_time(NaiveTime::MIN).and_utc(),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt,
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => naive.and_utc(),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            zoned_to_utc(date_time, &tzid)
        }
    }
}

fn zoned_to_utc(local: NaiveDateTime, tzid: &str) -> DateTime<Utc> {
    let name = tzid.trim_matches('"').trim_start_matches('/');
    let Some(tz) = resolve_timezone(name) else {
        debug!("Unknown TZID '{}', reading time as UTC", tzid);
        return local.and_utc();
    };

    match tz.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // Local time falls in a DST gap, move past it
        None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc()),
    }
}

/// Parse a DURATION value (`PT1H30M`, `P1D`, `-PT15M`)
fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.trim_start_matches('+')),
    };

    let parsed = iso8601::duration(body).ok()?;
    let std_duration: std::time::Duration = parsed.into();
    let duration = Duration::from_std(std_duration).ok()?;

    Some(if negative { -duration } else { duration })
}
