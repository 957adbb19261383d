//! Error types for metaforce-metadata.
//!
//! Every kind carries the operation it came from. Validation errors are
//! raised before anything is sent; everything else is what the transport or
//! the service reported, passed through without retries.

use crate::types::RemoteFault;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn validation(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation {
            operation: operation.to_string(),
            message: message.into(),
        })
    }

    pub(crate) fn invalid_response(operation: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidResponse {
            operation: operation.to_string(),
            message: message.into(),
        })
    }

    /// Wrap a transport failure. A SOAP fault becomes a [`RemoteFault`].
    pub(crate) fn from_transport(operation: &str, err: metaforce_client::Error) -> Self {
        let kind = match err.fault() {
            Some(fault) => ErrorKind::RemoteFault(RemoteFault {
                operation: operation.to_string(),
                full_name: None,
                status_code: fault.fault_code.clone(),
                message: fault.fault_string.clone(),
                errors: Vec::new(),
            }),
            None => ErrorKind::Transport {
                operation: operation.to_string(),
                message: err.to_string(),
            },
        };
        Self::with_source(kind, err)
    }

    /// The operation this error belongs to, if any.
    pub fn operation(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Auth(_) => Some("login"),
            ErrorKind::Validation { operation, .. }
            | ErrorKind::Transport { operation, .. }
            | ErrorKind::InvalidResponse { operation, .. } => Some(operation),
            ErrorKind::RemoteFault(fault) => Some(&fault.operation),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }

    pub fn is_auth(&self) -> bool {
        matches!(self.kind, ErrorKind::Auth(_))
    }

    pub fn remote_fault(&self) -> Option<&RemoteFault> {
        match &self.kind {
            ErrorKind::RemoteFault(fault) => Some(fault),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Login rejected; no session was installed.
    #[error("Auth error: {0}")]
    Auth(String),
    /// Missing or malformed input, detected before dispatch.
    #[error("Validation error in {operation}: {message}")]
    Validation { operation: String, message: String },
    /// Network or protocol failure reported by the transport.
    #[error("Transport error in {operation}: {message}")]
    Transport { operation: String, message: String },
    /// The service answered with a well-formed error.
    #[error("{0}")]
    RemoteFault(RemoteFault),
    /// The answer did not have the expected shape.
    #[error("Invalid response to {operation}: {message}")]
    InvalidResponse { operation: String, message: String },
}
