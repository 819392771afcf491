use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not signed in: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Rejected(String),
    #[error("backend error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Maps a non-success HTTP status and its server message to an error.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            s if s.is_client_error() => ApiError::Rejected(message),
            s => ApiError::Server {
                status: s.as_u16(),
                message,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
