use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the notifier
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar_notifier::config))]
    Config(String),

    #[error("Failed to fetch calendar: {0}")]
    #[diagnostic(code(calendar_notifier::fetch))]
    Fetch(String),

    #[error("Failed to parse calendar: {0}")]
    #[diagnostic(code(calendar_notifier::parse))]
    Parse(String),

    #[error("Failed to send notification: {0}")]
    #[diagnostic(code(calendar_notifier::delivery))]
    Delivery(String),

    #[error("Failed to store notification state: {0}")]
    #[diagnostic(code(calendar_notifier::state))]
    State(String),

    #[error(transparent)]
    #[diagnostic(code(calendar_notifier::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar_notifier::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar_notifier::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type NotifierResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create feed retrieval errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create calendar parse errors
pub fn parse_error(message: &str) -> Error {
    Error::Parse(message.to_string())
}

/// Helper to create webhook delivery errors
pub fn delivery_error(message: &str) -> Error {
    Error::Delivery(message.to_string())
}

/// Helper to create state persistence errors
pub fn state_error(message: &str) -> Error {
    Error::State(message.to_string())
}
