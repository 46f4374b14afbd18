use std::fmt;

use thiserror::Error;

use crate::models::BillId;

/// What happened to a bill whose line items could not all be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// The bill was deleted again; the server holds no trace of the attempt.
    RolledBack,
    /// Deleting the bill failed too, so it stays on the server without items.
    Orphaned,
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::RolledBack => write!(f, "the bill was rolled back"),
            Compensation::Orphaned => write!(f, "the bill could not be removed and has no items"),
        }
    }
}

/// Errors raised while talking to the billing API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server rejected the request with status {status}: {detail}")]
    ServerRejected { status: u16, detail: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Bill {bill_id} was created but {failed} of {attempted} items failed; {compensation}")]
    PartialWriteFailure {
        bill_id: BillId,
        failed: usize,
        attempted: usize,
        compensation: Compensation,
    },

    #[error("No access token found. Run `billing-admin token set <TOKEN>` first.")]
    MissingCredential,

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built, e.g. a token that is not a valid
    /// header value.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required fields: {0}")]
    InvalidDraft(String),
}

impl ApiError {
    /// Partial writes are reported as warnings rather than plain failures.
    pub fn is_partial_write(&self) -> bool {
        matches!(self, ApiError::PartialWriteFailure { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
