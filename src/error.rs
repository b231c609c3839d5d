//! Error types for Azure DevOps API operations.

use thiserror::Error;

/// Errors that can occur during Azure DevOps API operations.
#[derive(Debug, Error)]
pub enum AdoError {
    /// The service answered with HTTP 203, its signal for an
    /// unauthenticated call (instead of the usual 401/403).
    #[error("API call could not be authenticated correctly")]
    AuthenticationFailed,

    /// The request did not complete with HTTP 200. Carries the status
    /// code when the server answered at all; transport-level failures
    /// carry only the transport message.
    #[error("request to Azure DevOps failed: {message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },

    /// A work-item search returned zero results.
    #[error("could not find work item for '{0}'")]
    WorkItemNotFound(String),

    /// A work-item search reported more than one result.
    #[error("more than one work item found for '{0}'")]
    WorkItemNotUnique(String),

    /// The response body could not be mapped into an entity, either
    /// because it was not valid JSON or a required key was missing.
    #[error("failed to map response: {0}")]
    Mapping(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AdoError {
    /// Build a `RequestFailed` from a transport-level error.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        AdoError::RequestFailed {
            message: err.to_string(),
            status_code: None,
        }
    }
}

impl From<serde_json::Error> for AdoError {
    fn from(err: serde_json::Error) -> Self {
        AdoError::Mapping(err.to_string())
    }
}

/// Result type alias for Azure DevOps operations.
pub type Result<T> = core::result::Result<T, AdoError>;
