//! The transport port.

use crate::error::Result;
use crate::xml::XmlNode;

/// Namespace of the service an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceNamespace {
    /// Metadata API (`/services/Soap/m/...`).
    Metadata,
    /// Partner API (`/services/Soap/u/...`), used for `login` and `logout`.
    Partner,
}

impl ServiceNamespace {
    /// The XML namespace URI.
    pub fn uri(&self) -> &'static str {
        match self {
            ServiceNamespace::Metadata => "http://soap.sforce.com/2006/04/metadata",
            ServiceNamespace::Partner => "urn:partner.soap.sforce.com",
        }
    }
}

/// Target endpoint and session header for exactly one call.
///
/// The session id is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Absolute endpoint URL the call is posted to.
    pub endpoint: String,
    /// Session id for the `SessionHeader`; `None` for anonymous calls (login).
    pub session_id: Option<String>,
}

impl std::fmt::Debug for CallContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallContext")
            .field("endpoint", &self.endpoint)
            .field("session_id", &self.session_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CallContext {
    /// Create an anonymous context for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            session_id: None,
        }
    }

    /// Attach a session id.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// A single SOAP operation ready for dispatch.
///
/// `body` holds the children of the operation element, already serialized
/// and escaped. The transport wraps it in `<{operation} xmlns="...">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapCall {
    /// Operation name, also sent as the `SOAPAction` header.
    pub operation: String,
    /// Service the operation belongs to.
    pub namespace: ServiceNamespace,
    /// Serialized operation arguments.
    pub body: String,
}

impl SoapCall {
    /// A Metadata API operation.
    pub fn metadata(operation: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            namespace: ServiceNamespace::Metadata,
            body: body.into(),
        }
    }

    /// A Partner API operation.
    pub fn partner(operation: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            namespace: ServiceNamespace::Partner,
            body: body.into(),
        }
    }
}

/// Executes SOAP operations against a remote endpoint.
///
/// One invocation is one request/response exchange. Implementations must not
/// retry, must not cache the context between calls, and must surface a SOAP
/// fault as [`ErrorKind::Fault`](crate::ErrorKind::Fault).
///
/// On success the returned node is the operation response element, e.g.
/// `<deployResponse>`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Perform one call.
    async fn call(&self, context: &CallContext, call: SoapCall) -> Result<XmlNode>;
}
