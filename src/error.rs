use thiserror::Error;

/// Failure taxonomy shared by every handler. The bridge renders these as
/// `{ "error": message }`, except `UserCanceled` which becomes
/// `{ "canceled": true }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    DuplicateUsername(String),
    #[error("{0}")]
    NotFound(String),
    #[error("canceled by user")]
    UserCanceled,
    #[error("{0}")]
    OperationFailed(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn failed(err: impl std::fmt::Display) -> Self {
        AppError::OperationFailed(err.to_string())
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        AppError::failed(err)
    }
}

impl From<diesel::ConnectionError> for AppError {
    fn from(err: diesel::ConnectionError) -> Self {
        AppError::failed(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::failed(err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::failed(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::failed(err)
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::failed(err)
    }
}
