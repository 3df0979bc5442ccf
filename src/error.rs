use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Array shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    #[error("Dataset error on line {line}: {message}")]
    DatasetError { line: usize, message: String },

    #[error("Model format error: {message}")]
    ModelFormatError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Please complete all required fields (Class, Sex, Port). Missing: {}", missing.join(", "))]
    IncompleteForm { missing: Vec<&'static str> },
}

impl PredictorError {
    pub fn model_format(message: impl Into<String>) -> Self {
        PredictorError::ModelFormatError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PredictorError::ConfigError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;
