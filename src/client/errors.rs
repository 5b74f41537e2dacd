//! Failures surfaced by [`ExpenseSettlementClient`](super::ExpenseSettlementClient).
//!
//! HTTP failures are keyed by status code: 401, 403, 404 and 400 get their
//! own variant and every other non-2xx status lands in [`ClientError::Api`].
//! All of them expose `status_code()` and `detail()` uniformly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authentication failed")]
    Authentication { detail: Option<String> },

    #[error("Access forbidden")]
    Forbidden { detail: Option<String> },

    #[error("Resource not found")]
    NotFound { detail: Option<String> },

    #[error("Validation error")]
    Validation { detail: Option<String> },

    #[error("API request failed: {status_text}")]
    Api {
        status_code: u16,
        status_text: String,
        detail: Option<String>,
    },

    /// No HTTP response was produced (connection refused, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx body that does not have the shape the operation expects.
    #[error("could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

/// Discriminant of a [`ClientError`], for callers that only branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Forbidden,
    NotFound,
    Validation,
    Api,
    Transport,
    Decode,
    InvalidBaseUrl,
}

impl ClientError {
    /// Map a failed response to its variant. Pure: no transport involved.
    ///
    /// `status_text` is the reason phrase of the status line and only shows
    /// up in the message of the generic variant.
    pub fn from_status(status_code: u16, status_text: &str, detail: Option<String>) -> Self {
        match status_code {
            401 => ClientError::Authentication { detail },
            403 => ClientError::Forbidden { detail },
            404 => ClientError::NotFound { detail },
            400 => ClientError::Validation { detail },
            _ => ClientError::Api {
                status_code,
                status_text: status_text.to_string(),
                detail,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Authentication { .. } => ErrorKind::Authentication,
            ClientError::Forbidden { .. } => ErrorKind::Forbidden,
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Api { .. } => ErrorKind::Api,
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::InvalidBaseUrl(_) => ErrorKind::InvalidBaseUrl,
        }
    }

    /// HTTP status of the failed response; `None` when no response was
    /// classified.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Authentication { .. } => Some(401),
            ClientError::Forbidden { .. } => Some(403),
            ClientError::NotFound { .. } => Some(404),
            ClientError::Validation { .. } => Some(400),
            ClientError::Api { status_code, .. } => Some(*status_code),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            ClientError::Decode(_) | ClientError::InvalidBaseUrl(_) => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Authentication { detail }
            | ClientError::Forbidden { detail }
            | ClientError::NotFound { detail }
            | ClientError::Validation { detail }
            | ClientError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }
}
