use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrikeError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type StrikeResult<T> = Result<T, StrikeError>;
