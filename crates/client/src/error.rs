//! Client-side failures.

use domain::services::LifecycleError;
use thiserror::Error;

/// Shown when neither the server nor the transport gave a usable message.
pub const GENERIC_FAILURE: &str = "요청 처리 중 오류가 발생했습니다.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Blocked locally; no request was sent.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Lifecycle(e) => e.to_string(),
            ClientError::Validation(message) => message.clone(),
            ClientError::Server { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// True when the request never left the client.
    pub fn is_local(&self) -> bool {
        matches!(self, ClientError::Lifecycle(_) | ClientError::Validation(_))
    }
}
