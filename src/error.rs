//! Engine error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid pairwise matrix: {0}")]
    InvalidMatrix(String),

    #[error("unknown question '{0}'")]
    UnknownQuestion(String),

    #[error("unknown option '{code}' for question '{question_id}'")]
    UnknownOption { question_id: String, code: String },

    #[error("invalid crop record at row {row}: {reason}")]
    InvalidCrop { row: usize, reason: String },

    #[error("store error: {0}")]
    Store(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
