use thiserror::Error;

#[derive(Debug, Error)]
pub enum GanttError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging already initialized")]
    LoggingInitialized,
}
