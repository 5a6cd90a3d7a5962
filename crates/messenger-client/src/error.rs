//! Error types for Messenger client operations

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for Messenger client operations
pub type Result<T> = std::result::Result<T, MessengerError>;

/// Errors that can occur while building or sending a Messenger request
#[derive(Error, Debug)]
pub enum MessengerError {
    /// No access token was supplied at construction
    #[error("The access token is required.")]
    MissingAccessToken,

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph URL plus version did not form a valid URI
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Caller supplied an unusable argument combination
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The Graph API answered with a structured error body
    #[error("Failed calling send API: [{code}][{error_type}] {message}")]
    Api {
        status: u16,
        code: i64,
        error_type: String,
        message: String,
        error_subcode: Option<i64>,
        fbtrace_id: Option<String>,
    },

    /// Non-2xx response without a recognizable Graph error body
    #[error("Failed calling send API: HTTP {status}: {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// The request went out but nothing came back
    #[error("Failed calling send API, no response was received.")]
    NoResponse(#[source] reqwest::Error),

    /// Request could not be built or sent
    #[error(transparent)]
    Transport(reqwest::Error),
}

impl MessengerError {
    /// Graph API error code, if this is a remote API error
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::UnexpectedResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a reqwest failure that happened before any response arrived.
    ///
    /// Builder errors (bad header value, body that fails to serialize) mean
    /// nothing was sent, so they are propagated as-is. Everything else
    /// (connect, timeout, connection reset) counts as "no response".
    pub(crate) fn from_send_failure(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Transport(err)
        } else {
            Self::NoResponse(err)
        }
    }

    /// Build an error from a non-2xx status and its raw body
    pub(crate) fn from_error_body(status: u16, body: String) -> Self {
        match serde_json::from_str::<GraphErrorResponse>(&body) {
            Ok(GraphErrorResponse { error }) => Self::Api {
                status,
                code: error.code,
                error_type: error.error_type,
                message: error.message,
                error_subcode: error.error_subcode,
                fbtrace_id: error.fbtrace_id,
            },
            Err(_) => Self::UnexpectedResponse { status, body },
        }
    }
}

/// Error envelope returned by the Graph API
#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
    code: i64,
    #[serde(default)]
    error_subcode: Option<i64>,
    #[serde(default)]
    fbtrace_id: Option<String>,
}
