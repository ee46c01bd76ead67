use calendar_notifier::startup;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting calendar notifier");

    // Single pass: fetch, detect, notify, persist
    startup::start().await
}
