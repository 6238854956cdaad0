use thiserror::Error;

#[derive(Error, Debug)]
pub enum DftError {
    /// Allocation, transfer or launch failure on the accelerator
    #[error("Accelerator error during {stage}: {message}")]
    AcceleratorError { stage: String, message: String },

    /// A computed pixel diverged from the reference beyond tolerance
    #[error("Accuracy mismatch at pixel {pixel}: error {error:e} exceeds threshold {threshold:e}")]
    AccuracyMismatch {
        pixel: usize,
        error: f64,
        threshold: f64,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DftError {
    pub fn accelerator(stage: impl Into<String>, message: impl ToString) -> Self {
        Self::AcceleratorError {
            stage: stage.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DftError>;
