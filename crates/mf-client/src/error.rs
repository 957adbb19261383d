//! Error types for metaforce-client.

use crate::soap::SoapFault;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Returns the SOAP fault if the service answered with one.
    pub fn fault(&self) -> Option<&SoapFault> {
        match &self.kind {
            ErrorKind::Fault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns true if the request never produced a well-formed answer.
    pub fn is_network(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout | ErrorKind::Connection(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Non-success HTTP status without a SOAP fault body.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The service answered with a SOAP fault.
    #[error("{0}")]
    Fault(SoapFault),

    /// Malformed XML or an envelope without the expected structure.
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::with_source(ErrorKind::Xml(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

/// Sanitize a response body before it ends up in an error message.
///
/// Truncates to 500 characters and removes anything that looks like a
/// session id or access token.
pub(crate) fn sanitize_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let token_pattern = regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+")
        .map(|re| re.replace_all(message, "[REDACTED_TOKEN]").to_string());
    let mut sanitized = token_pattern.unwrap_or_else(|_| message.to_string());

    let session_pattern = regex_lite::Regex::new(r"<(\w+:)?sessionId>[^<]*</(\w+:)?sessionId>")
        .map(|re| re.replace_all(&sanitized, "<sessionId>[REDACTED]</sessionId>").to_string());
    if let Ok(redacted) = session_pattern {
        sanitized = redacted;
    }

    if sanitized.chars().count() > MAX_LENGTH {
        sanitized = sanitized.chars().take(MAX_LENGTH).collect();
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
