#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input at row {row}: {message}")]
    InvalidInput { row: usize, message: String },

    #[error("graph has no nodes")]
    EmptyGraph,

    #[error("initial {axis} positions have {actual} values, expected {expected}")]
    InvalidSeed {
        axis: char,
        expected: usize,
        actual: usize,
    },

    #[error("step count must be at least 1 (got {steps})")]
    InvalidStepCount { steps: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_input(row: usize, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            row,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
