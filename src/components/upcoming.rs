use crate::components::calendar_feed::CalendarEvent;
use crate::components::notification_state::NotificationState;
use chrono::{DateTime, Duration, Utc};

/// Lookahead interval `[now, now + minutes]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionWindow {
    pub now: DateTime<Utc>,
    pub minutes: u32,
}

impl DetectionWindow {
    pub fn new(now: DateTime<Utc>, minutes: u32) -> Self {
        Self { now, minutes }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.now + Duration::minutes(i64::from(self.minutes))
    }

    /// Whether the event starts inside the window and has not already ended
    pub fn contains(&self, event: &CalendarEvent) -> bool {
        event.start >= self.now && event.start <= self.end() && event.end > self.now
    }
}

/// Events due for notification, earliest start first.
///
/// Skips events without a UID and events whose UID is already in `state`.
pub fn detect_upcoming_events(
    events: &[CalendarEvent],
    window: &DetectionWindow,
    state: &NotificationState,
) -> Vec<CalendarEvent> {
    let mut upcoming: Vec<CalendarEvent> = events
        .iter()
        .filter(|event| !event.uid.is_empty())
        .filter(|event| !state.contains(&event.uid))
        .filter(|event| window.contains(event))
        .cloned()
        .collect();

    upcoming.sort_by_key(|event| event.start);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn event(uid: &str, start_offset: i64, end_offset: i64) -> CalendarEvent {
        CalendarEvent::new(
            uid,
            format!("Event {}", uid),
            now() + Duration::minutes(start_offset),
            now() + Duration::minutes(end_offset),
        )
    }

    fn uids(events: &[CalendarEvent]) -> Vec<&str> {
        events.iter().map(|e| e.uid.as_str()).collect()
    }

    #[test]
    fn test_filters_and_sorts() {
        let events = vec![
            event("1", 10, 20),
            event("2", -5, 5),
            event("3", 30, 40),
            event("4", 15, 25),
        ];
        let state: NotificationState = [("1", "")].into_iter().collect();

        let upcoming = detect_upcoming_events(&events, &DetectionWindow::new(now(), 20), &state);

        assert_eq!(uids(&upcoming), vec!["4"]);
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let events = vec![event("at-now", 0, 10), event("at-end", 20, 30), event("past-end", 21, 30)];

        let upcoming = detect_upcoming_events(
            &events,
            &DetectionWindow::new(now(), 20),
            &NotificationState::new(),
        );

        assert_eq!(uids(&upcoming), vec!["at-now", "at-end"]);
    }

    #[test]
    fn test_excludes_events_already_over() {
        // Zero-length event starting right now has ended by "now"
        let events = vec![event("instant", 0, 0), event("negative", 5, -5), event("ok", 5, 6)];

        let upcoming = detect_upcoming_events(
            &events,
            &DetectionWindow::new(now(), 60),
            &NotificationState::new(),
        );

        assert_eq!(uids(&upcoming), vec!["ok"]);
    }

    #[test]
    fn test_skips_empty_uid() {
        let events = vec![event("", 5, 10), event("named", 5, 10)];

        let upcoming = detect_upcoming_events(
            &events,
            &DetectionWindow::new(now(), 60),
            &NotificationState::new(),
        );

        assert_eq!(uids(&upcoming), vec!["named"]);
    }

    #[test]
    fn test_output_sorted_for_any_input_order() {
        let events = vec![event("c", 50, 55), event("a", 1, 2), event("b", 25, 30), event("d", 59, 70)];
        let window = DetectionWindow::new(now(), 60);

        let forward = detect_upcoming_events(&events, &window, &NotificationState::new());
        let mut reversed_input = events.clone();
        reversed_input.reverse();
        let backward = detect_upcoming_events(&reversed_input, &window, &NotificationState::new());

        assert_eq!(uids(&forward), vec!["a", "b", "c", "d"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_known_uid_never_returned() {
        let events = vec![event("seen", 1, 2), event("seen", 3, 4)];
        let state: NotificationState = [("seen", "2024-01-01T12:01:00+00:00")].into_iter().collect();

        let upcoming = detect_upcoming_events(&events, &DetectionWindow::new(now(), 60), &state);

        assert!(upcoming.is_empty());
    }

    #[test]
    fn test_record_then_detect_is_idempotent() {
        let events = vec![event("a", 5, 10), event("b", 10, 20)];
        let window = DetectionWindow::new(now(), 30);

        let mut state = NotificationState::new();
        let first = detect_upcoming_events(&events, &window, &state);
        assert_eq!(first.len(), 2);

        state.record(&first);
        let second = detect_upcoming_events(&events, &window, &state);
        assert!(second.is_empty());
    }
}
