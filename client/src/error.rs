//! Ledger client error taxonomy.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, or a non-2xx answer
    /// that is not an explicit rejection.
    #[error("ledger service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response from ledger service: {0}")]
    Decode(String),

    /// The service explicitly declined a mutation.
    #[error("rejected by ledger service: {0}")]
    Rejected(String),

    /// The request was refused locally and never sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the failure happened on the way to or from the service, as
    /// opposed to the service answering with something we refuse.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::ServiceUnavailable(_))
    }
}

impl From<aztecs_types::TypesError> for ClientError {
    fn from(e: aztecs_types::TypesError) -> Self {
        ClientError::InvalidRequest(e.to_string())
    }
}
