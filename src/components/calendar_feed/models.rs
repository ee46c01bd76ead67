use chrono::{DateTime, Utc};

/// Calendar event as read from the feed, with all times normalised to UTC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    /// UID of the VEVENT, empty when the feed omits it
    pub uid: String,
    /// SUMMARY, empty when the feed omits it
    pub summary: String,
    pub start: DateTime<Utc>,
    /// DTEND, or DTSTART + DURATION, or the start itself
    pub end: DateTime<Utc>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl CalendarEvent {
    /// Create an event with no description or location
    pub fn new(
        uid: impl Into<String>,
        summary: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            summary: summary.into(),
            start,
            end,
            description: None,
            location: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_empty(location.into());
        self
    }
}

/// Map blank text to `None`
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
