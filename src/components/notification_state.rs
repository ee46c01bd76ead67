use crate::components::calendar_feed::CalendarEvent;
use crate::error::{state_error, NotifierResult};
use crate::utils::time::parse_iso_instant;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

/// Default number of days a notified event stays in the state
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Event UIDs that have already been notified, mapped to the event start
/// (ISO-8601) recorded when the notification went out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationState {
    entries: BTreeMap<String, String>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the state file.
    ///
    /// Never fails: a missing file is an empty state, and so is a file that
    /// cannot be read or is not a JSON object of strings.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No notification state at {}, starting empty", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Could not read notification state {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring corrupt notification state {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the state as pretty JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> NotifierResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    state_error(&format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .map_err(|e| state_error(&format!("Failed to write {}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Copy of the state without entries whose recorded start is more than
    /// `retention_days` before `now`. Unparsable timestamps are kept.
    pub fn prune(&self, now: DateTime<Utc>, retention_days: u32) -> Self {
        // No representable cutoff means nothing is old enough to drop
        let cutoff = Duration::try_days(i64::from(retention_days))
            .and_then(|retention| now.checked_sub_signed(retention));

        let entries = self
            .entries
            .iter()
            .filter(|(_, start)| match (parse_iso_instant(start), cutoff) {
                (Some(start), Some(cutoff)) => start >= cutoff,
                _ => true,
            })
            .map(|(uid, start)| (uid.clone(), start.clone()))
            .collect();

        Self { entries }
    }

    /// Remember notified events under their UID
    pub fn record(&mut self, events: &[CalendarEvent]) {
        for event in events {
            self.entries.insert(event.uid.clone(), event.start.to_rfc3339());
        }
    }

    /// Insert a raw entry
    pub fn insert(&mut self, uid: impl Into<String>, start: impl Into<String>) {
        self.entries.insert(uid.into(), start.into());
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    pub fn get(&self, uid: &str) -> Option<&str> {
        self.entries.get(uid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NotificationState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(uid, start)| (uid.into(), start.into()))
                .collect(),
        }
    }
}
