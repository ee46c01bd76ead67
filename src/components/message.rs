use crate::components::calendar_feed::CalendarEvent;
use crate::utils::time::format_in_zone;
use chrono_tz::Tz;
use rust_i18n::t;

/// Locales with message translations
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ja"];

/// Default message locale
pub const DEFAULT_LOCALE: &str = "en";

/// Build the single webhook message for all events, in the given order
pub fn build_message(events: &[CalendarEvent], tz: &Tz, window_minutes: u32, locale: &str) -> String {
    let header = t!("notice_header", locale = locale, minutes = window_minutes);
    let body = events
        .iter()
        .map(|event| format_event(event, tz, locale))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n{}", header, body)
}

/// One event as a block of `- ` prefixed lines
pub fn format_event(event: &CalendarEvent, tz: &Tz, locale: &str) -> String {
    let title = if event.summary.trim().is_empty() {
        t!("notice_untitled", locale = locale).to_string()
    } else {
        event.summary.clone()
    };
    let mut details = vec![format!("**{}**", title)];

    details.push(format!(
        "{}: {} ({}) / {} (UTC)",
        t!("notice_start", locale = locale),
        format_in_zone(&event.start, tz),
        tz.name(),
        format_in_zone(&event.start, &Tz::UTC),
    ));
    details.push(format!(
        "{}: {} ({}) / {} (UTC)",
        t!("notice_end", locale = locale),
        format_in_zone(&event.end, tz),
        tz.name(),
        format_in_zone(&event.end, &Tz::UTC),
    ));

    if let Some(location) = &event.location {
        details.push(format!("{}: {}", t!("notice_location", locale = locale), location));
    }
    if let Some(description) = &event.description {
        details.push(format!("{}: {}", t!("notice_description", locale = locale), description));
    }

    details
        .iter()
        .map(|line| format!("- {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn planning_meeting() -> CalendarEvent {
        CalendarEvent::new(
            "abc",
            "Planning meeting",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        )
        .with_location("Online")
        .with_description("Quarterly planning")
    }

    #[test]
    fn test_build_message_utc() {
        let message = build_message(&[planning_meeting()], &Tz::UTC, 60, "en");

        let expected = "The following events start within 60 minutes:\n\
- **Planning meeting**\n\
- Start: 2024-01-01 09:00 (UTC) / 2024-01-01 09:00 (UTC)\n\
- End: 2024-01-01 10:00 (UTC) / 2024-01-01 10:00 (UTC)\n\
- Location: Online\n\
- Description: Quarterly planning";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_build_message_local_zone_and_order() {
        let later = CalendarEvent::new(
            "later",
            "Retro",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        );

        let message = build_message(&[planning_meeting(), later], &Tz::Asia__Tokyo, 45, "en");

        assert!(message.contains("- Start: 2024-01-01 18:00 (Asia/Tokyo) / 2024-01-01 09:00 (UTC)"));
        assert!(message.contains("- End: 2024-01-01 19:00 (Asia/Tokyo) / 2024-01-01 10:00 (UTC)"));
        // Blocks separated by a blank line, in the given order
        let first = message.find("Planning meeting").unwrap();
        let second = message.find("Retro").unwrap();
        assert!(first < second);
        assert!(message.contains("Quarterly planning\n\n- **Retro**"));
    }

    #[test]
    fn test_optional_lines_omitted() {
        let bare = CalendarEvent::new(
            "bare",
            "Standup",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap(),
        );

        let block = format_event(&bare, &Tz::UTC, "en");

        assert_eq!(block.lines().count(), 3);
        assert!(!block.contains("Location"));
        assert!(!block.contains("Description"));
    }

    #[test]
    fn test_untitled_event_placeholder_is_localised() {
        let untitled = CalendarEvent::new(
            "untitled",
            "",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap(),
        );

        assert!(format_event(&untitled, &Tz::UTC, "en").starts_with("- **(No title)**\n"));
        assert!(format_event(&untitled, &Tz::UTC, "ja").starts_with("- **(無題)**\n"));
    }

    #[test]
    fn test_japanese_locale() {
        let message = build_message(&[planning_meeting()], &Tz::Asia__Tokyo, 20, "ja");

        assert!(message.starts_with("以下の予定が20分以内に開始します:\n"));
        assert!(message.contains("- 開始: 2024-01-01 18:00 (Asia/Tokyo) / 2024-01-01 09:00 (UTC)"));
        assert!(message.contains("- 場所: Online"));
        assert!(message.contains("- 説明: Quarterly planning"));
    }
}
