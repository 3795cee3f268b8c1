//! Error types for recommender training and evaluation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecError {
    #[error("Recommender is not fitted yet (missing: {0})")]
    NotFitted(String),

    #[error("Insufficient unrated candidates: requested {requested}, only {available} available")]
    InsufficientCandidates { available: usize, requested: usize },

    #[error("Invalid number of factors: requested {requested}, at most {max} allowed")]
    DimensionalityError { requested: usize, max: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Product {0} is not rated by the user")]
    ProductNotRated(usize),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, RecError>;
