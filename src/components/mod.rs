// Pipeline stages
pub mod calendar_feed;
pub mod message;
pub mod notification_state;
pub mod upcoming;
pub mod webhook;

pub use calendar_feed::{CalendarEvent, FeedSource, HttpFeed};
pub use notification_state::NotificationState;
pub use upcoming::{detect_upcoming_events, DetectionWindow};
pub use webhook::{Notifier, WebhookNotifier};
