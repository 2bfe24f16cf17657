use thiserror::Error;

/// Custom error types for prompt-pilot
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Malformed dictionary payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("Remote tag search failed: {0}")]
    Remote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
