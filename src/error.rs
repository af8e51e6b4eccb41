//! Error handling for the resume analyser

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeAnalyserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document parse error: {0}")]
    DocumentParse(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Entity recognition error: {0}")]
    EntityRecognition(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, ResumeAnalyserError>;

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for ResumeAnalyserError {
    fn from(err: candle_core::Error) -> Self {
        ResumeAnalyserError::EntityRecognition(err.to_string())
    }
}
