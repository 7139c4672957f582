use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("unknown learning rate adjustment: {0}")]
    UnknownLrAdjust(String),

    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: (usize, usize), got: (usize, usize) },

    #[error("nothing to compare, the input is empty")]
    Empty,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
