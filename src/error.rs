/// Error types for the dashboard

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Messaging failed: {0}")]
    Messaging(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Loading {tab} timed out after {millis} ms")]
    LoadTimedOut { tab: &'static str, millis: u32 },

    #[error("Local storage unavailable: {0}")]
    Storage(String),

    #[error("Invalid restore data: {0}")]
    InvalidRestoreData(String),

    #[error("Restore file rejected: {0}")]
    RejectedFile(String),
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
