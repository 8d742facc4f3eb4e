use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("invalid timestamp: {0:?} (expected RFC 3339, YYYY-MM-DD[ HH:MM[:SS]] or epoch milliseconds)")]
    InvalidTimestamp(String),

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },
}
