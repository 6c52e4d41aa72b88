use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The search was cancelled before it produced a result.
    #[error("search was cancelled")]
    Cancelled,

    /// The worker went away without sending a result.
    #[error("search worker stopped without a result")]
    WorkerLost,
}

pub type EngineResult<T> = Result<T, EngineError>;
