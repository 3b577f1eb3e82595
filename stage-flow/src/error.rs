use thiserror::Error;

/// Errors that can occur while building or running a pipeline
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Stage not found: {0}")]
    StageNotFound(String),

    #[error("Stage execution failed: {0}")]
    StageExecutionFailed(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, FlowError>;
