use thiserror::Error;

/// Uniform failure surfaced by every backend read.
///
/// Transport failures, non-2xx responses and `{"status": "error"}` envelopes all
/// collapse into this type so callers only ever see a message, never a raw
/// `reqwest` error shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("API error: {0}")]
    ApiLogicError(String),

    #[error("Invalid API response: {0}")]
    ParseError(String),
}

impl ApiError {
    /// Message suitable for an error banner or notification body
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NetworkError(msg) => format!("Cannot reach backend: {}", msg),
            ApiError::HttpError { status, message } => format!("Backend returned {}: {}", status, message),
            ApiError::ApiLogicError(msg) => msg.clone(),
            ApiError::ParseError(msg) => format!("Unexpected response: {}", msg),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ApiError::NetworkError(format!("request timed out: {}", err));
        }
        match err.status() {
            Some(status) => ApiError::HttpError {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ApiError::NetworkError(err.to_string()),
        }
    }
}
