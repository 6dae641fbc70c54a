use std::path::PathBuf;
use thiserror::Error;

use crate::features::Field;

/// Failure to turn a RawInput into a FeatureVector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("missing required field '{field}'")]
    MissingField { field: Field },

    #[error("unknown value '{value}' for '{field}' (expected Male or Female)")]
    UnknownCategory { field: Field, value: String },

    #[error("field '{field}' must be numeric, got '{value}'")]
    UnexpectedLabel { field: Field, value: String },

    #[error("field '{field}' must be a finite number, got {value}")]
    NonFinite { field: Field, value: f64 },
}

/// The model call failed or produced something unusable.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("prediction failed: {message}")]
pub struct PredictionServiceError {
    pub message: String,
}

impl PredictionServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Appending to the prediction log failed.
#[derive(Debug, Error)]
#[error("failed to write prediction log at {}: {source}", path.display())]
pub struct LogWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Anything that aborts a single predict action.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Prediction(#[from] PredictionServiceError),
}
