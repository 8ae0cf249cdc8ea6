use thiserror::Error;

/// Failures inside the summarization pipeline. None of these reach API
/// callers: each one degrades to an extractive summary.
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Failed to load model '{candidate}': {reason}")]
    ModelLoad { candidate: String, reason: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Model lock poisoned by an earlier panic")]
    LockPoisoned,

    #[error("Summarization pipeline failed: {0}")]
    Critical(String),
}

pub type Result<T> = std::result::Result<T, SummarizerError>;
