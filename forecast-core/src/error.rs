use thiserror::Error;

/// Failures a data source may report to the screen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    /// The location could not be resolved. Data sources substitute a fallback
    /// name instead of surfacing this.
    #[error("location unavailable")]
    LocationUnavailable,

    #[error("forecast fetch failed: {message}")]
    FetchFailed { message: String },
}

impl ForecastError {
    pub fn fetch_failed<S: Into<String>>(message: S) -> Self {
        Self::FetchFailed { message: message.into() }
    }
}

/// Precondition violations on the screen's cell accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("cell index {index} out of range (screen holds {count} cells)")]
    CellOutOfRange { index: usize, count: usize },
}
