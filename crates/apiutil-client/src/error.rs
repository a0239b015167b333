//! Error types for the API client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the API client
#[derive(Error, Debug)]
pub enum Error {
    /// Structured error body returned by the service
    #[error("API error {code} ({kind}): {info}")]
    Api {
        code: i64,
        kind: String,
        info: String,
        errors: Vec<ApiErrorDetail>,
    },

    /// 401 without a usable error body
    #[error("Unauthorized: status {0}")]
    Unauthorized(u16),

    /// Any other non-200 without a usable error body
    #[error("Response not ok: status {0}")]
    ResponseNotOk(u16),

    /// Token issuance response carried no `token` header
    #[error("No token in response")]
    MissingToken,

    /// Endpoint template and qualifiers disagree
    #[error("Endpoint qualifier mismatch: got {got}, template expects {expected}")]
    QualifierMismatch { got: usize, expected: usize },

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Missing base URL, API name and similar preconditions
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure reported by a custom transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    Request(#[from] http::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

impl Error {
    /// HTTP status carried by a normalized response error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { code, .. } => u16::try_from(*code).ok(),
            Error::Unauthorized(status) | Error::ResponseNotOk(status) => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened before or during the network round trip
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Transport(_))
    }
}

/// Error body the service sends on failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(rename = "Code", default)]
    pub code: i64,

    #[serde(rename = "Type", default)]
    pub kind: String,

    #[serde(rename = "errors", default)]
    pub errors: Option<Vec<ApiErrorDetail>>,

    #[serde(rename = "CombinedInfo", default)]
    pub combined_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "Info", default)]
    pub info: String,

    #[serde(rename = "Type", default)]
    pub kind: String,
}

impl ApiErrorResponse {
    /// Code, type and combined message are all present
    pub fn has_information(&self) -> bool {
        self.code != 0 && !self.kind.is_empty() && !self.combined_info.is_empty()
    }
}

impl From<ApiErrorResponse> for Error {
    fn from(body: ApiErrorResponse) -> Self {
        Error::Api {
            code: body.code,
            kind: body.kind,
            info: body.combined_info,
            errors: body.errors.unwrap_or_default(),
        }
    }
}
