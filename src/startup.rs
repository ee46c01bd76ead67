use crate::components::calendar_feed::{fetch_events, FeedSource, HttpFeed};
use crate::components::message::build_message;
use crate::components::notification_state::NotificationState;
use crate::components::upcoming::{detect_upcoming_events, DetectionWindow};
use crate::components::webhook::{Notifier, WebhookNotifier};
use crate::config::Config;
use crate::error::{Error, NotifierResult};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{error, info, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log line layout: `[INFO] message`
struct LevelPrefixFormat;

impl<S, N> FormatEvent<S, N> for LevelPrefixFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .with_writer(std::io::stdout)
        .event_format(LevelPrefixFormat)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}

/// What a single pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Events parsed from the feed
    pub events_in_feed: usize,
    /// Stale state entries dropped
    pub pruned: usize,
    /// Events included in the sent notification
    pub notified: usize,
}

/// Run one fetch → detect → notify → persist pass.
///
/// State is only written after a successful delivery, or when there is
/// nothing to deliver.
pub async fn run(
    config: &Config,
    feed: &dyn FeedSource,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
) -> NotifierResult<RunSummary> {
    info!("Using timezone: {}", config.timezone.name());

    let events = fetch_events(feed).await?;
    info!("Retrieved {} events from calendar", events.len());

    let loaded = NotificationState::load(&config.state_file);
    let mut state = loaded.prune(now, config.retention_days);
    let pruned = loaded.len() - state.len();
    if pruned > 0 {
        info!("Cleaned up {} old notification(s) from state", pruned);
    }

    let window = DetectionWindow::new(now, config.window_minutes);
    let mut upcoming = detect_upcoming_events(&events, &window, &state);
    if let Some(max_events) = config.max_events {
        upcoming.truncate(max_events);
    }

    let mut summary = RunSummary {
        events_in_feed: events.len(),
        pruned,
        notified: 0,
    };

    if upcoming.is_empty() {
        info!("No upcoming events to notify");
        state.save(&config.state_file)?;
        info!(
            "Ensured notification state is stored at {}",
            config.state_file.display()
        );
        return Ok(summary);
    }

    let message = build_message(&upcoming, &config.timezone, config.window_minutes, &config.locale);
    info!("Sending notification for {} event(s)", upcoming.len());
    notifier.notify(&message).await?;

    state.record(&upcoming);
    state.save(&config.state_file)?;
    info!("Saved notification state to {}", config.state_file.display());

    summary.notified = upcoming.len();
    Ok(summary)
}

/// Wire the HTTP collaborators and run one pass against the wall clock
async fn run_with_http(config: &Config) -> NotifierResult<RunSummary> {
    let feed = HttpFeed::new(config.feed_url.clone())?;
    let notifier = WebhookNotifier::new(config.webhook_url.clone())?;
    run(config, &feed, &notifier, Utc::now()).await
}

/// Load config and run one pass
pub async fn start() -> miette::Result<()> {
    let config = load_config()?;

    match run_with_http(&config).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
