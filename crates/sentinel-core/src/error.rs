use thiserror::Error;

/// Failure reported by the external market data source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("API quota exceeded")]
    QuotaExceeded,

    #[error("Ticker not found: {0}")]
    NotFound(String),

    #[error("Transient fetch failure: {0}")]
    Transient(String),
}

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl SentinelError {
    /// Errors recovered locally by skipping the affected ticker or
    /// indicator. Configuration errors are never recoverable and must
    /// surface before any scan starts.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SentinelError::InsufficientData(_) | SentinelError::DataUnavailable(_)
        )
    }
}
