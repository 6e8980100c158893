//! Domain error types.

/// Why a single raw row was left out of a prepared series.
///
/// Row problems are never fatal: the row is dropped and preparation continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RowError {
    #[error("row {row}: unparseable date {value:?}")]
    Date { row: usize, value: String },

    #[error("row {row}: missing or non-numeric close {value:?}")]
    Close { row: usize, value: String },
}

/// Failure to obtain daily bars from the remote quote service.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network failure, timeout, or a body that could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Top-level error type for tickercast.
#[derive(Debug, thiserror::Error)]
pub enum TickercastError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("price store error: {reason}")]
    Store { reason: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("a refresh is already in progress")]
    RefreshInProgress,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TickercastError {
    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store {
            reason: reason.into(),
        }
    }
}

impl From<&TickercastError> for std::process::ExitCode {
    fn from(err: &TickercastError) -> Self {
        let code: u8 = match err {
            TickercastError::Io(_) => 1,
            TickercastError::ConfigParse { .. }
            | TickercastError::ConfigMissing { .. }
            | TickercastError::ConfigInvalid { .. } => 2,
            TickercastError::Store { .. } => 3,
            TickercastError::Fetch(_) => 4,
            TickercastError::RefreshInProgress => 5,
        };
        std::process::ExitCode::from(code)
    }
}
