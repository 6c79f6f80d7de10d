use crate::backend::BackendError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::wizard::{FileConstraintViolation, SubmissionFailure, WizardError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Draft(serde_json::Error),
    Backend(BackendError),
    Wizard(WizardError),
    Staging(FileConstraintViolation),
    Submission(SubmissionFailure),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Draft(err) => write!(f, "invalid draft: {}", err),
            AppError::Backend(err) => write!(f, "backend error: {}", err),
            AppError::Wizard(err) => write!(f, "wizard error: {}", err),
            AppError::Staging(err) => write!(f, "document rejected: {}", err),
            AppError::Submission(err) => write!(f, "submission failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Draft(err) => Some(err),
            AppError::Backend(err) => Some(err),
            AppError::Wizard(err) => Some(err),
            AppError::Staging(err) => Some(err),
            AppError::Submission(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Draft(value)
    }
}

impl From<BackendError> for AppError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

impl From<WizardError> for AppError {
    fn from(value: WizardError) -> Self {
        Self::Wizard(value)
    }
}

impl From<FileConstraintViolation> for AppError {
    fn from(value: FileConstraintViolation) -> Self {
        Self::Staging(value)
    }
}

impl From<SubmissionFailure> for AppError {
    fn from(value: SubmissionFailure) -> Self {
        Self::Submission(value)
    }
}
