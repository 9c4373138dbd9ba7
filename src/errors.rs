use thiserror::Error;

use crate::types::ResourceKind;

/// failures at the transport boundary; the embedding application's http
/// stack maps its own errors into these
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed with status {code}")]
    Status { code: u16 },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("could not fetch {resource}: {source}")]
    Transport {
        resource: ResourceKind,
        source: TransportError,
    },

    #[error("response for {resource} matched no known envelope shape")]
    UnexpectedShape { resource: ResourceKind },

    #[error("could not decode {resource} record: {message}")]
    Decode {
        resource: ResourceKind,
        message: String,
    },

    #[error("payment request rejected: {message}")]
    PaymentRejected { message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
