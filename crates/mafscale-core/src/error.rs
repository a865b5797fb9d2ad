//! Error types for datalog ingestion and curve scaling

use thiserror::Error;

/// Errors that can occur while loading datalogs and scaling a curve
#[derive(Error, Debug)]
pub enum ScaleError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("log format mismatch: {0}")]
    FormatMismatch(String),

    #[error("parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
